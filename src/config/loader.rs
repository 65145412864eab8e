//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::BankConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that points at the config file.
pub const CONFIG_PATH_ENV_VAR: &str = "BANK_CONFIG";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, reason } => write!(f, "Invalid {}: {}", key, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: TOML file (optional), then environment overrides,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<BankConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => BankConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `BANK_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut BankConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("BANK_BIND_ADDRESS") {
        config.server.bind_address = v;
    }
    if let Some(v) = lookup("BANK_DATABASE_PATH") {
        config.database.path = v;
    }
    if let Some(v) = lookup("BANK_RPC_URL") {
        config.chain.rpc_url = v;
    }
    if let Some(v) = lookup("BANK_CHAIN_ID") {
        config.chain.chain_id = parse_env("BANK_CHAIN_ID", &v)?;
    }
    if let Some(v) = lookup("BANK_GAS_LIMIT") {
        config.chain.default_gas_limit = parse_env("BANK_GAS_LIMIT", &v)?;
    }
    if let Some(v) = lookup("BANK_LOG_LEVEL") {
        config.observability.log_level = v;
    }
    Ok(())
}

fn parse_env(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BANK_RPC_URL", "http://rpc.internal:8545"),
            ("BANK_CHAIN_ID", "31337"),
            ("BANK_GAS_LIMIT", "250000"),
        ]
        .into_iter()
        .collect();

        let mut config = BankConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.chain.rpc_url, "http://rpc.internal:8545");
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.chain.default_gas_limit, 250_000);
        assert_eq!(config.database.path, "data/accounts");
    }

    #[test]
    fn test_malformed_env_value() {
        let mut config = BankConfig::default();
        let err = apply_env_overrides(&mut config, |k| {
            (k == "BANK_CHAIN_ID").then(|| "mainnet".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("BANK_CHAIN_ID"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            bind_address = "127.0.0.1:9000"

            [database]
            path = ""
            "#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert!(config.database.path.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/bank.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
