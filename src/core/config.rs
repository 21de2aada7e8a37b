mod parsing;
mod settings;
mod types;

pub use types::{
    ApiUrl, BackendSettings, ConfigError, Environment, ListingSettings, RuntimeSettings,
    SessionSettings, Settings, TelemetrySettings,
};
