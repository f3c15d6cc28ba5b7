//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::FaucetConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the RPC endpoint from the config file.
pub const RPC_URL_ENV: &str = "RPC_URL";
/// Overrides the key folder from the config file.
pub const KEYS_DIR_ENV: &str = "FAUCET_KEYS_DIR";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FaucetConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<FaucetConfig, ConfigError> {
    let config: FaucetConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the effective configuration.
///
/// Reads `.env` if present, then the TOML file when given (defaults
/// otherwise), then applies environment overrides and validates the
/// result.
pub fn load(path: Option<&Path>) -> Result<FaucetConfig, ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "Failed to read .env file");
        }
    }

    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => FaucetConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut FaucetConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(RPC_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.blockchain.rpc_url = url.trim().to_string();
    }
    if let Some(dir) = lookup(KEYS_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        config.keys.folder = PathBuf::from(dir.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ConfirmationStrategy, FeeMode};
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [blockchain]
            rpc_url = "http://localhost:8545"
            chain_id = 31337

            [fees]
            mode = "legacy"

            [confirmation]
            strategy = "nonce_delta"
            poll_interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.blockchain.rpc_url, "http://localhost:8545");
        assert_eq!(config.blockchain.chain_id, Some(31337));
        assert_eq!(config.blockchain.rpc_timeout_secs, 10);
        assert_eq!(config.fees.mode, FeeMode::Legacy);
        assert_eq!(config.fees.transfer_gas_limit, 21_000);
        assert_eq!(config.confirmation.strategy, ConfirmationStrategy::NonceDelta);
        assert_eq!(config.confirmation.poll_interval_ms, 250);
        assert_eq!(config.race.timeout_secs, 3);
        assert_eq!(config.keys.account_a, "accountA");
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let err = parse_config("[fees]\nmode = \"turbo\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_runs_validation() {
        let err = parse_config("[race]\ntimeout_secs = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "race.timeout_secs"),
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keys]\nfolder = \"/tmp/faucet-keys\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.keys.folder, PathBuf::from("/tmp/faucet-keys"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/faucet.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (RPC_URL_ENV, " http://10.0.0.2:8545 "),
            (KEYS_DIR_ENV, "/var/lib/faucet"),
        ]
        .into_iter()
        .collect();

        let mut config = FaucetConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.blockchain.rpc_url, "http://10.0.0.2:8545");
        assert_eq!(config.keys.folder, PathBuf::from("/var/lib/faucet"));
    }

    #[test]
    fn test_blank_env_override_is_ignored() {
        let mut config = FaucetConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.blockchain.rpc_url, "http://0.0.0.0:9545");
    }
}
