use anyhow::Result;
use enketi::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the CLI and initialize logging/telemetry
    let action = cli::start()?;

    // Handle the action
    let result = action.execute().await;

    cli::telemetry::shutdown_tracer();

    result
}
