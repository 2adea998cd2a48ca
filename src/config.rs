//! Settings read from the Lambda environment.

use std::time::Duration;

use thiserror::Error;

use crate::client::ClientConfig;
use crate::lifecycle::WaitPolicies;
use crate::retry::RetryPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Everything a handler binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub client: ClientConfig,
    pub waits: WaitPolicies,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match text(name) {
                Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    name,
                    value,
                }),
                None => Ok(default),
            }
        };

        let defaults = WaitPolicies::default();

        let table_deletion = RetryPolicy {
            delay: Duration::from_millis(number(
                "TABLE_DELETE_POLL_DELAY_MS",
                defaults.table_deletion.delay.as_millis() as u64,
            )?),
            timeout: Duration::from_millis(number(
                "TABLE_DELETE_POLL_TIMEOUT_MS",
                defaults.table_deletion.timeout.as_millis() as u64,
            )?),
            ..defaults.table_deletion
        };

        let times = number(
            "TABLE_DESCRIBE_RETRY_TIMES",
            u64::from(defaults.table_visibility.times),
        )?;
        let table_visibility = RetryPolicy {
            times: u32::try_from(times).unwrap_or(u32::MAX),
            delay: Duration::from_millis(number(
                "TABLE_DESCRIBE_RETRY_DELAY_MS",
                defaults.table_visibility.delay.as_millis() as u64,
            )?),
            timeout: Duration::from_millis(number(
                "TABLE_DESCRIBE_RETRY_TIMEOUT_MS",
                defaults.table_visibility.timeout.as_millis() as u64,
            )?),
            ..defaults.table_visibility
        };

        Ok(Self {
            client: ClientConfig {
                region: text("AWS_REGION"),
                profile: text("AWS_PROFILE"),
                endpoint_url: text("DYNAMODB_ENDPOINT_URL"),
            },
            waits: WaitPolicies {
                table_deletion,
                table_visibility,
            },
        })
    }
}
