pub mod api;
pub mod auth;
pub mod core;
pub mod schemas;
pub mod session;
pub mod views;
pub mod workflow;

mod cli;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, context::AppContext, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let command = cli::parse(std::env::args().skip(1))?;
    let ctx = AppContext::init(settings).await?;

    let result = cli::execute(&ctx, command).await;
    if let Err(err) = &result {
        tracing::debug!(error = %err, "command failed");
    }

    ctx.shutdown().await;
    result
}
