use anyhow::Result;

use cyberday_cli::CliConfig;
use cyberday_core::CancelToken;

fn main() -> Result<()> {
    cyberday_observability::init();

    let config = CliConfig::from_env()?;
    tracing::info!(
        seed = config.simulation.seed,
        duration = config.simulation.duration_ticks,
        "cyberday run starting"
    );

    let output = cyberday_cli::execute(&config, &CancelToken::new())?;

    // Warnings are part of a successful run; the caller decides whether
    // the counts are acceptable.
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
