use anyhow::Result;

mod config;
mod handlers;
mod logging;
mod router;
mod runner;
mod state;

use runner::Runner;

/// Parses configuration, initialises logging, and runs the verification HTTP server.
#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::Config::from_env()?;
    logging::init_tracing(&cfg);
    cfg.info();

    let runner = Runner::builder(cfg)
        .load_key()
        .await
        .bind_public()
        .await?
        .build()?;

    runner.run().await
}
