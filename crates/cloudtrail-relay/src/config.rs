// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::RelayError;
use crate::tls::EndpointTrust;
use reqwest::Url;
use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENDPOINT_ENV: &str = "UNOMALY_API_ENDPOINT";
pub const BATCH_SIZE_ENV: &str = "UNOMALY_BATCH_SIZE";
pub const TIMEOUT_ENV: &str = "UNOMALY_TIMEOUT_SECS";
pub const CA_CERT_PATH_ENV: &str = "UNOMALY_CA_CERT_PATH";
pub const LOG_LEVEL_ENV: &str = "UNOMALY_LOG_LEVEL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for one relay invocation
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// URL every batch is POSTed to
    pub endpoint: Url,
    /// Maximum number of events per outbound request
    pub batch_size: NonZeroUsize,
    /// Per-request timeout toward the endpoint
    pub timeout: Duration,
    /// PEM certificate to pin instead of skipping certificate verification
    pub ca_cert_path: Option<PathBuf>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl RelayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, RelayError> {
        let endpoint = env::var(ENDPOINT_ENV)
            .map_err(|_| RelayError::InvalidConfig(format!("{ENDPOINT_ENV} is not set")))?;
        let endpoint = parse_endpoint(&endpoint)?;

        let batch_size = env::var(BATCH_SIZE_ENV)
            .map_err(|_| RelayError::InvalidConfig(format!("{BATCH_SIZE_ENV} is not set")))?;
        let batch_size = parse_batch_size(&batch_size)?;

        let timeout = match env::var(TIMEOUT_ENV) {
            Ok(val) => parse_timeout(&val)?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let ca_cert_path = env::var(CA_CERT_PATH_ENV)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let config = Self {
            endpoint,
            batch_size,
            timeout,
            ca_cert_path,
            log_level: log_level_from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.timeout.is_zero() {
            return Err(RelayError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(RelayError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    /// How the delivery client should treat the endpoint's certificate.
    pub fn trust(&self) -> EndpointTrust {
        match &self.ca_cert_path {
            Some(path) => EndpointTrust::PinnedCertificate(path.clone()),
            None => EndpointTrust::AcceptInvalidCerts,
        }
    }
}

/// Reads the log level from the environment, lowercased, defaulting to `info`.
///
/// Exposed separately so the binary can set up logging before the rest of the
/// configuration is loaded.
pub fn log_level_from_env() -> String {
    env::var(LOG_LEVEL_ENV)
        .map(|val| val.trim().to_lowercase())
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

fn parse_endpoint(value: &str) -> Result<Url, RelayError> {
    let url = Url::parse(value.trim()).map_err(|err| {
        RelayError::InvalidConfig(format!("{ENDPOINT_ENV} '{value}' is not a valid URL: {err}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RelayError::InvalidConfig(format!(
            "{ENDPOINT_ENV} must use http or https, got '{other}'"
        ))),
    }
}

/// Parses the batch size. There is no fallback: anything but a positive integer is fatal.
///
/// Accepts integer literal syntax: `0x`, `0o` and `0b` prefixes, a leading `0` for
/// octal, and `_` between digits.
pub fn parse_batch_size(value: &str) -> Result<NonZeroUsize, RelayError> {
    let invalid = || {
        RelayError::InvalidConfig(format!("{BATCH_SIZE_ENV} '{value}' is not a valid integer"))
    };

    let literal = value.trim();
    let (negative, literal) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    let (radix, digits) = split_radix(literal);
    if digits.is_empty()
        || digits.ends_with('_')
        || digits.contains("__")
        || (radix == 10 && digits.starts_with('_'))
        || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(invalid());
    }

    let size = usize::from_str_radix(&digits.replace('_', ""), radix).map_err(|_| invalid())?;
    NonZeroUsize::new(size)
        .filter(|_| !negative)
        .ok_or_else(|| RelayError::InvalidConfig(format!("{BATCH_SIZE_ENV} must be greater than 0")))
}

fn split_radix(literal: &str) -> (u32, &str) {
    let lower = literal.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &literal[2..]),
        Some("0o") => (8, &literal[2..]),
        Some("0b") => (2, &literal[2..]),
        _ if literal.len() > 1 && literal.starts_with('0') => (8, &literal[1..]),
        _ => (10, literal),
    }
}

fn parse_timeout(value: &str) -> Result<Duration, RelayError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|err| {
            RelayError::InvalidConfig(format!("{TIMEOUT_ENV} '{value}' is not a valid integer: {err}"))
        })
}
