//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MAX_CONCURRENT_RENDERS: usize = 16;
const MAX_REDIRECTS: usize = 20;

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: "must not exceed 5 minutes (300000ms)".into(),
        });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` or `render_timeout_ms` is below 100ms or above 5 minutes
    /// - `max_concurrent_renders` is 0 or exceeds 16
    /// - `max_redirects` exceeds 20
    /// - `payload_ttl_secs` or `sweep_interval_secs` is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("timeout_ms", self.timeout_ms)?;
        check_timeout("render_timeout_ms", self.render_timeout_ms)?;

        if self.max_concurrent_renders == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_renders".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_concurrent_renders > MAX_CONCURRENT_RENDERS {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_renders".into(),
                reason: format!("must not exceed {MAX_CONCURRENT_RENDERS}"),
            });
        }

        if self.max_redirects > MAX_REDIRECTS {
            return Err(ConfigError::Invalid {
                field: "max_redirects".into(),
                reason: format!("must not exceed {MAX_REDIRECTS}"),
            });
        }

        if self.payload_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "payload_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.sweep_interval_secs > self.payload_ttl_secs {
            tracing::warn!(
                sweep_interval_secs = self.sweep_interval_secs,
                payload_ttl_secs = self.payload_ttl_secs,
                "sweep interval is longer than the payload TTL; \
                 expired payloads are still evicted on read"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_render_timeout_exceeds_limit() {
        let config = AppConfig { render_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "render_timeout_ms"));
    }

    #[test]
    fn test_validate_zero_renders() {
        let config = AppConfig { max_concurrent_renders: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_concurrent_renders"));
    }

    #[test]
    fn test_validate_too_many_renders() {
        let config = AppConfig { max_concurrent_renders: 17, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_concurrent_renders"));
    }

    #[test]
    fn test_validate_too_many_redirects() {
        let config = AppConfig { max_redirects: 21, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_redirects"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = AppConfig { payload_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "payload_ttl_secs"));
    }

    #[test]
    fn test_validate_zero_sweep_interval() {
        let config = AppConfig { sweep_interval_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "sweep_interval_secs"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            timeout_ms: 100,
            render_timeout_ms: 300_000,
            max_concurrent_renders: 16,
            max_redirects: 0,
            payload_ttl_secs: 1,
            sweep_interval_secs: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
