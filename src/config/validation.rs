//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, margins bounded)
//! - Check key file names are usable and distinct
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FaucetConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::FaucetConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &FaucetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.blockchain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("invalid URL '{}'", config.blockchain.rpc_url),
        ));
    }
    for url in &config.blockchain.failover_urls {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.failover_urls",
                format!("invalid URL '{}'", url),
            ));
        }
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }

    let names = [
        ("keys.account_a", &config.keys.account_a),
        ("keys.account_b", &config.keys.account_b),
        ("keys.faucet", &config.keys.faucet),
    ];
    let mut seen = HashSet::new();
    for (field, name) in names {
        if name.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::new(field, format!("duplicate file name '{}'", name)));
        }
    }

    let multiplier = config.fees.gas_price_multiplier;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        errors.push(ValidationError::new("fees.gas_price_multiplier", "must be a positive number"));
    }
    if config.fees.gas_limit_margin_percent > 1000 {
        errors.push(ValidationError::new("fees.gas_limit_margin_percent", "must be <= 1000"));
    }
    if config.fees.transfer_gas_limit < 21_000 {
        errors.push(ValidationError::new(
            "fees.transfer_gas_limit",
            "must cover a plain transfer (21000)",
        ));
    }

    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new("confirmation.poll_interval_ms", "must be > 0"));
    }
    if config.race.timeout_secs == 0 {
        errors.push(ValidationError::new("race.timeout_secs", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
