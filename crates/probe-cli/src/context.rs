use std::io::{self, Write};

use probe_client::render::render_exchange;
use probe_client::{ApiClient, Exchange};
use probe_core::{ProbeConfig, ProbeError, ProbeResult};

use crate::cli::{Cli, OutputFormat};
use crate::output;

const SUCCESS: &[u16] = &[200, 201, 202, 204];

pub struct ProbeContext {
    pub config: ProbeConfig,
    pub client: ApiClient,
    pub format: OutputFormat,
}

impl ProbeContext {
    pub fn from_cli(cli: &Cli) -> ProbeResult<Self> {
        let config = resolve_config(cli)?;
        let mut client = ApiClient::from_config(&config)?;
        if let Some(token) = &cli.token {
            client.set_token(token.clone());
        }
        tracing::debug!(base_url = %client.base_url(), "context ready");
        Ok(Self {
            config,
            client,
            format: cli.format,
        })
    }

    /// Where scenario transcripts go. JSON mode keeps stdout for the envelope.
    pub fn console(&self) -> Box<dyn Write + Send> {
        match self.format {
            OutputFormat::Text => Box::new(io::stdout()),
            OutputFormat::Json => Box::new(io::sink()),
        }
    }

    pub fn require_token(&self) -> ProbeResult<()> {
        match self.client.token() {
            Some(_) => Ok(()),
            None => Err(ProbeError::Unauthenticated(
                "pass --token or set KANBAN_PROBE_TOKEN".into(),
            )),
        }
    }

    /// Prints one ad hoc exchange. Non-2xx answers end the command with an error.
    pub fn show(&self, exchange: &Exchange) -> anyhow::Result<()> {
        let checked = exchange.expect_status(SUCCESS);
        match self.format {
            OutputFormat::Json => match checked {
                Ok(_) => output::output_success(exchange),
                Err(e) => output::output_failure(exchange, &e.to_string()),
            },
            OutputFormat::Text => {
                let mut stdout = io::stdout().lock();
                write!(stdout, "{}", render_exchange(exchange))?;
                stdout.flush()?;
                checked?;
            }
        }
        Ok(())
    }
}

/// File (explicit `--config` or the default location) first, then flags and
/// environment on top.
pub fn resolve_config(cli: &Cli) -> ProbeResult<ProbeConfig> {
    let mut config = match &cli.config {
        Some(path) => ProbeConfig::load_from(path)?,
        None => ProbeConfig::load(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(delay) = cli.startup_delay_ms {
        config.startup_delay_ms = delay;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    Ok(config)
}
