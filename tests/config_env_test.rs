//! Environment overrides for stream configuration.

use std::time::Duration;

use serial_test::serial;

use streamfeed::session::{RETRY_DELAY_ENV, RETRY_ENV};
use streamfeed::traits::StreamRequest;
use streamfeed::StreamConfig;

fn clear_env() {
    std::env::remove_var(RETRY_ENV);
    std::env::remove_var(RETRY_DELAY_ENV);
}

fn request() -> StreamRequest {
    StreamRequest::get("http://localhost/events")
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = StreamConfig::from_env(request());

    assert_eq!(config.retry, 0);
    assert_eq!(config.retry_delay, Duration::from_millis(1000));
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var(RETRY_ENV, "4");
    std::env::set_var(RETRY_DELAY_ENV, " 250 ");

    let config = StreamConfig::from_env(request());

    assert_eq!(config.retry, 4);
    assert_eq!(config.retry_delay, Duration::from_millis(250));
    clear_env();
}

#[test]
#[serial]
fn test_from_env_ignores_invalid_values() {
    clear_env();
    std::env::set_var(RETRY_ENV, "lots");
    std::env::set_var(RETRY_DELAY_ENV, "-5");

    let config = StreamConfig::from_env(request());

    assert_eq!(config.retry, 0);
    assert_eq!(config.retry_delay, Duration::from_millis(1000));
    clear_env();
}

#[test]
#[serial]
fn test_from_env_clamps_huge_retry() {
    clear_env();
    std::env::set_var(RETRY_ENV, "99999999999");

    let config = StreamConfig::from_env(request());

    assert_eq!(config.retry, u32::MAX);
    clear_env();
}
