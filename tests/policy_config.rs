//! Loading retry policies from configuration.
#![cfg(feature = "serde")]

use serde::Deserialize;
use std::time::Duration;
use steadfast::{Backoff, RetryPolicy};

#[derive(Debug, Deserialize)]
struct ClientConfig {
    endpoint: String,
    retry: RetryPolicy,
}

#[test]
fn policy_embeds_in_larger_config() {
    let json = r#"{
        "endpoint": "https://mirror.example.org",
        "retry": { "max_attempts": 5, "delay_ms": 250, "backoff": "linear", "max_delay_ms": 1000 }
    }"#;

    let config: ClientConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.endpoint, "https://mirror.example.org");
    assert_eq!(config.retry.max_attempts(), 5);
    assert_eq!(config.retry.backoff(), Backoff::Linear);
    assert_eq!(config.retry.delay_after(4), Some(Duration::from_millis(1000)));
    assert_eq!(config.retry.delay_after(5), None);
}

#[test]
fn invalid_policy_fails_the_whole_config() {
    let json = r#"{
        "endpoint": "https://mirror.example.org",
        "retry": { "max_attempts": 0, "delay_ms": 250 }
    }"#;

    let result: Result<ClientConfig, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn default_policy_serializes_three_attempts_500ms() {
    let value = serde_json::to_value(RetryPolicy::default()).unwrap();

    assert_eq!(value["max_attempts"], 3);
    assert_eq!(value["delay_ms"], 500);
    assert_eq!(value["backoff"], "fixed");
    assert!(value["max_delay_ms"].is_null());
}
