use anyhow::Context;
use booking_diag::core::report::{render_json, render_text};
use booking_diag::utils::logger;
use booking_diag::{CliConfig, OutputFormat, RestDiagnosticsRunner, RunOutcome};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.format {
        OutputFormat::Text => logger::init_cli_logger(cli.verbose),
        OutputFormat::Json => logger::init_json_logger(),
    }

    tracing::info!("Starting booking-diag");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 設定錯誤在任何階段執行前就結束
    let runner = match cli
        .into_diagnostics_config()
        .and_then(|config| RestDiagnosticsRunner::from_config(&config))
    {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(RunOutcome::Aborted.exit_code());
        }
    };

    let report = runner.run().await;

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => {
            match render_json(&report).context("failed to serialize diagnostics report") {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    tracing::error!("❌ {:#}", e);
                    eprintln!("❌ {:#}", e);
                    std::process::exit(RunOutcome::Aborted.exit_code());
                }
            }
        }
    }

    let exit_code = report.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
