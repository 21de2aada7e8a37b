pub mod config;
pub mod context;
pub(crate) mod metrics;
pub mod telemetry;
pub mod time;
