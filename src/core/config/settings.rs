use std::path::PathBuf;

use super::parsing::{
    clamp_page_size, env_optional, env_or_default, parse_bool, parse_environment, parse_u32,
    parse_u64,
};
use super::types::{
    ApiUrl, BackendSettings, ConfigError, ListingSettings, RuntimeSettings, SessionSettings,
    Settings, TelemetrySettings,
};

const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let api_url = env_or_default("PRESTASI_API_URL", DEFAULT_API_URL);
        let request_timeout_seconds = parse_u64(
            "PRESTASI_REQUEST_TIMEOUT_SECONDS",
            env_or_default("PRESTASI_REQUEST_TIMEOUT_SECONDS", "30"),
        )?;
        let connect_timeout_seconds = parse_u64(
            "PRESTASI_CONNECT_TIMEOUT_SECONDS",
            env_or_default("PRESTASI_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;

        let environment = parse_environment(env_optional("PRESTASI_ENV"));
        let session_dir = PathBuf::from(env_or_default("PRESTASI_SESSION_DIR", ".prestasi"));
        let page_size =
            parse_u32("PRESTASI_PAGE_SIZE", env_or_default("PRESTASI_PAGE_SIZE", "10"))?;

        let log_level = env_or_default("PRESTASI_LOG_LEVEL", "info");
        let json = env_optional("PRESTASI_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            backend: BackendSettings {
                api_url: ApiUrl::parse(api_url)?,
                request_timeout_seconds,
                connect_timeout_seconds,
            },
            runtime: RuntimeSettings { environment },
            session: SessionSettings { dir: session_dir },
            listing: ListingSettings { page_size: clamp_page_size(page_size) },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn backend(&self) -> &BackendSettings {
        &self.backend
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    pub fn listing(&self) -> &ListingSettings {
        &self.listing
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "PRESTASI_REQUEST_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.backend.connect_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "PRESTASI_CONNECT_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.runtime.environment.is_production()
            && self.backend.api_url.as_str().starts_with("http://")
        {
            return Err(ConfigError::InvalidValue {
                field: "PRESTASI_API_URL",
                value: self.backend.api_url.as_str().to_string(),
            });
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_tests(api_url: &str, session_dir: PathBuf) -> Self {
        Self {
            backend: BackendSettings {
                api_url: ApiUrl::parse(api_url.to_string()).expect("test api url"),
                request_timeout_seconds: 5,
                connect_timeout_seconds: 2,
            },
            runtime: RuntimeSettings { environment: super::types::Environment::Test },
            session: SessionSettings { dir: session_dir },
            listing: ListingSettings { page_size: 10 },
            telemetry: TelemetrySettings { log_level: "debug".to_string(), json: false },
        }
    }
}
