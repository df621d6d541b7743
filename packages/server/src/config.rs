use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use distiller::RetryPolicy;
use dotenvy::dotenv;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,

    /// Extractor attempts per stage, including the first
    pub max_attempts: u32,

    /// Backoff before the first retry; doubles per subsequent retry
    pub backoff_base: Duration,

    /// Wall-clock budget for a whole distillation job
    pub job_timeout: Duration,

    /// Idle period after which an event stream is closed
    pub stream_idle_timeout: Duration,

    /// Broadcast channel capacity per job topic
    pub stream_capacity: usize,

    /// Smallest document accepted for distillation, in characters
    pub min_document_chars: usize,

    /// Largest document accepted for distillation, in bytes
    pub max_document_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            job_timeout: Duration::from_secs(600),
            stream_idle_timeout: Duration::from_secs(30),
            stream_capacity: 256,
            min_document_chars: 100,
            max_document_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("PORT must be a valid number")?,
            max_attempts: env::var("EXTRACTOR_MAX_ATTEMPTS")
                .unwrap_or_else(|_| defaults.max_attempts.to_string())
                .parse()
                .context("EXTRACTOR_MAX_ATTEMPTS must be a valid number")?,
            backoff_base: Duration::from_millis(
                env::var("EXTRACTOR_BACKOFF_BASE_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .context("EXTRACTOR_BACKOFF_BASE_MS must be a valid number")?,
            ),
            job_timeout: Duration::from_secs(
                env::var("JOB_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .context("JOB_TIMEOUT_SECS must be a valid number")?,
            ),
            stream_idle_timeout: Duration::from_secs(
                env::var("STREAM_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("STREAM_IDLE_TIMEOUT_SECS must be a valid number")?,
            ),
            stream_capacity: env::var("STREAM_CAPACITY")
                .unwrap_or_else(|_| defaults.stream_capacity.to_string())
                .parse()
                .context("STREAM_CAPACITY must be a valid number")?,
            min_document_chars: env::var("MIN_DOCUMENT_CHARS")
                .unwrap_or_else(|_| defaults.min_document_chars.to_string())
                .parse()
                .context("MIN_DOCUMENT_CHARS must be a valid number")?,
            max_document_bytes: env::var("MAX_DOCUMENT_BYTES")
                .unwrap_or_else(|_| defaults.max_document_bytes.to_string())
                .parse()
                .context("MAX_DOCUMENT_BYTES must be a valid number")?,
        })
    }

    /// Per-stage retry policy derived from the configured budget.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.backoff_base,
            ..RetryPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = Config::default();
        assert_eq!(config.min_document_chars, 100);
        assert_eq!(config.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(config.retry_policy().max_attempts, 3);
    }
}
