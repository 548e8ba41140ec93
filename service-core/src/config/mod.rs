use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Loads `.env`, the optional `configuration` file and `APP__*` variables.
    /// The bare `PORT`, `LOG_LEVEL` and `OTLP_ENDPOINT` variables take precedence.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", env_value("PORT"))?
            .set_override_option("log_level", env_value("LOG_LEVEL"))?
            .set_override_option("otlp_endpoint", env_value("OTLP_ENDPOINT"))?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Set and non-empty, so `PORT=` falls back to the default like an unset variable.
fn env_value(key: &str) -> Option<String> {
    non_empty(std::env::var(key).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config: Config = Cfg::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_port_override_is_parsed() {
        let config: Config = Cfg::builder()
            .set_override("port", "8088")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 8088);
    }

    #[test]
    fn test_empty_port_falls_back_to_default() {
        let config: Config = Cfg::builder()
            .set_override_option("port", non_empty(Some(String::new())))
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(non_empty(Some("4000".to_string())), Some("4000".to_string()));
        assert_eq!(non_empty(Some("  ".to_string())), None);
    }
}
