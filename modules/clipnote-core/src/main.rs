use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clipnote_common::Config;
use clipnote_core::Orchestrator;

/// Analyze a URL (thread, video, article) or a freeform topic and print a
/// structured summary as JSON.
#[derive(Parser, Debug)]
#[command(name = "clipnote", version, about)]
struct Args {
    /// URL or topic text to analyze.
    input: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("clipnote=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = Config::from_env();
    config.log_redacted();

    let orchestrator = Orchestrator::from_config(&config);
    let summary = orchestrator.analyze(&args.input).await?;

    info!(title = %summary.title, "Analysis complete");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
