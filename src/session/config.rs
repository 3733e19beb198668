//! Stream session configuration.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::traits::StreamRequest;

/// Default delay between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Environment variable overriding the retry count.
pub const RETRY_ENV: &str = "STREAMFEED_RETRY";

/// Environment variable overriding the retry delay, in milliseconds.
pub const RETRY_DELAY_ENV: &str = "STREAMFEED_RETRY_DELAY_MS";

/// Configuration for one logical stream.
///
/// Use the builder methods to customize behaviour.
///
/// # Example
///
/// ```ignore
/// use streamfeed::session::StreamConfig;
/// use streamfeed::traits::StreamRequest;
///
/// let config = StreamConfig::new(StreamRequest::get("https://example.com/events"))
///     .with_retry(3)
///     .with_retry_delay(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Request to issue (again on every attempt)
    pub request: StreamRequest,
    /// External cancellation signal
    pub signal: Option<CancellationToken>,
    /// Number of re-issues allowed after a failed attempt (default: 0)
    pub retry: u32,
    /// Wait between attempts (default: 1s)
    pub retry_delay: Duration,
    /// Also retry when the body fails mid-read (default: false)
    pub retry_read_errors: bool,
}

impl StreamConfig {
    /// Create a config with no retries and no external signal.
    pub fn new(request: StreamRequest) -> Self {
        Self {
            request,
            signal: None,
            retry: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_read_errors: false,
        }
    }

    /// Attach an external cancellation signal.
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set the number of retries.
    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Set the delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set whether mid-stream read failures are retried.
    pub fn with_retry_read_errors(mut self, retry: bool) -> Self {
        self.retry_read_errors = retry;
        self
    }

    /// Create a config whose retry settings come from the environment.
    ///
    /// Reads `STREAMFEED_RETRY` and `STREAMFEED_RETRY_DELAY_MS`; missing or
    /// unparseable values keep the defaults.
    pub fn from_env(request: StreamRequest) -> Self {
        let mut config = Self::new(request);

        if let Some(retry) = env_number(RETRY_ENV) {
            config.retry = u32::try_from(retry).unwrap_or(u32::MAX);
        }
        if let Some(ms) = env_number(RETRY_DELAY_ENV) {
            config.retry_delay = Duration::from_millis(ms);
        }

        config
    }
}

fn env_number(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::new(StreamRequest::get("http://localhost/events"));
        assert_eq!(config.retry, 0);
        assert_eq!(config.retry_delay, Duration::from_millis(1000));
        assert!(config.signal.is_none());
        assert!(!config.retry_read_errors);
    }

    #[test]
    fn test_stream_config_builder_chain() {
        let signal = CancellationToken::new();
        let config = StreamConfig::new(StreamRequest::get("http://localhost/events"))
            .with_signal(signal.clone())
            .with_retry(2)
            .with_retry_delay(Duration::from_millis(10))
            .with_retry_read_errors(true);

        assert_eq!(config.retry, 2);
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert!(config.retry_read_errors);

        signal.cancel();
        assert!(config.signal.unwrap().is_cancelled());
    }
}
