mod cli;
mod context;
mod handlers;
mod output;
mod scenarios;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat};
use context::ProbeContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("KANBAN_PROBE_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::ServeMock { host, port } => {
            return handlers::mock::handle(host, *port).await;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "kanban-probe",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        _ => {}
    }

    let ctx = match ProbeContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) if cli.format == OutputFormat::Json => output::output_error(&e.to_string()),
        Err(e) => return Err(e.into()),
    };

    let result = match cli.command {
        Commands::Run(args) => handlers::run::handle(&ctx, args).await,
        Commands::Auth(auth_cmd) => handlers::auth::handle(&ctx, auth_cmd.action).await,
        Commands::Board(board_cmd) => handlers::board::handle(&ctx, board_cmd.action).await,
        Commands::List(list_cmd) => handlers::list::handle(&ctx, list_cmd.action).await,
        Commands::Card(card_cmd) => handlers::card::handle(&ctx, card_cmd.action).await,
        Commands::Comment(comment_cmd) => {
            handlers::comment::handle(&ctx, comment_cmd.action).await
        }
        Commands::ServeMock { .. } | Commands::Completions { .. } => Ok(()),
    };

    match result {
        Err(e) if ctx.format == OutputFormat::Json => output::output_error(&format!("{e:#}")),
        other => other,
    }
}
