use probe_core::Recorder;

use crate::cli::{OutputFormat, RunArgs};
use crate::context::ProbeContext;
use crate::output;
use crate::scenarios;

pub async fn handle(ctx: &ProbeContext, args: RunArgs) -> anyhow::Result<()> {
    let reports = scenarios::run(ctx, args.scenario).await;

    let aborted = reports.iter().any(|r| r.aborted.is_some());
    let failed = reports.iter().any(|r| r.failures() > 0);
    let exit_failure = aborted || (args.strict && failed);

    match ctx.format {
        OutputFormat::Json if exit_failure => {
            let message = if aborted {
                "scenario aborted"
            } else {
                "scenario steps failed"
            };
            output::output_failure(&reports, message)
        }
        OutputFormat::Json => output::output_success(&reports),
        OutputFormat::Text => {
            println!("\nSummary");
            for report in &reports {
                println!("  {}", report.summary_line());
            }
            if exit_failure {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
