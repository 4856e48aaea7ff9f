use std::env;
use thiserror::Error;

use taskpad_core::database_file;

pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Server configuration resolved from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on (PORT)
    pub port: u16,
    /// Allowed CORS origin (CORS_ORIGIN)
    pub cors_origin: String,
    /// Storage connection string, `sqlite:<path>` or `json:<path>` (DATABASE_URL)
    pub database_url: String,
    /// Provision schema/snapshot files at startup (AUTO_PROVISION)
    pub auto_provision: bool,
    /// Import the legacy JSON snapshot into SQLite at startup (IMPORT_LEGACY)
    pub import_legacy: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) => parse_port(&value)?,
            Err(_) => DEFAULT_PORT,
        };

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{}", database_file().display()));

        let auto_provision = match env::var("AUTO_PROVISION") {
            Ok(value) => parse_bool("AUTO_PROVISION", &value)?,
            Err(_) => true,
        };

        let import_legacy = match env::var("IMPORT_LEGACY") {
            Ok(value) => parse_bool("IMPORT_LEGACY", &value)?,
            Err(_) => false,
        };

        Ok(Self {
            port,
            cors_origin,
            database_url,
            auto_provision,
            import_legacy,
        })
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port: u16 = value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: "PORT",
        value: value.to_string(),
        reason: "expected a number between 1 and 65535",
    })?;

    if port == 0 {
        return Err(ConfigError::Invalid {
            var: "PORT",
            value: value.to_string(),
            reason: "port 0 is not allowed",
        });
    }

    Ok(port)
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_accepts_valid_values() {
        assert_eq!(parse_port("4001").unwrap(), 4001);
        assert_eq!(parse_port(" 8080 ").unwrap(), 8080);
    }

    #[test]
    fn test_parse_port_rejects_zero_and_garbage() {
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("http").is_err());
    }

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("AUTO_PROVISION", "true").unwrap());
        assert!(parse_bool("AUTO_PROVISION", "1").unwrap());
        assert!(parse_bool("AUTO_PROVISION", "YES").unwrap());
        assert!(!parse_bool("IMPORT_LEGACY", "false").unwrap());
        assert!(!parse_bool("IMPORT_LEGACY", "0").unwrap());
        assert!(parse_bool("IMPORT_LEGACY", "maybe").is_err());
    }
}
