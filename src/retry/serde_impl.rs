//! Serde support for retry policies (feature-gated)
//!
//! A policy is stored as plain numbers so it can live in a config file:
//!
//! ```json
//! { "max_attempts": 3, "delay_ms": 500, "backoff": "fixed", "max_delay_ms": null }
//! ```
//!
//! `backoff` and `max_delay_ms` may be omitted. Deserialization goes through
//! [`RetryPolicy::new`], so a zero attempt budget is rejected. Serialization
//! fails rather than round a delay that is not a whole number of milliseconds.
//!
//! ```rust
//! use steadfast::RetryPolicy;
//!
//! let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 5, "delay_ms": 100}"#).unwrap();
//! assert_eq!(policy.max_attempts(), 5);
//!
//! let bad: Result<RetryPolicy, _> = serde_json::from_str(r#"{"max_attempts": 0, "delay_ms": 100}"#);
//! assert!(bad.is_err());
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

use super::policy::{Backoff, RetryPolicy};

#[derive(Serialize, Deserialize)]
struct PolicyConfig {
    max_attempts: u32,
    delay_ms: u64,
    #[serde(default)]
    backoff: Backoff,
    #[serde(default)]
    max_delay_ms: Option<u64>,
}

impl Serialize for Backoff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Backoff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Backoff::from_name(&name).ok_or_else(|| {
            D::Error::unknown_variant(&name, &["fixed", "linear", "exponential"])
        })
    }
}

impl Serialize for RetryPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PolicyConfig {
            max_attempts: self.max_attempts(),
            delay_ms: whole_millis::<S::Error>(self.delay())?,
            backoff: self.backoff(),
            max_delay_ms: self.max_delay().map(whole_millis::<S::Error>).transpose()?,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RetryPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let config = PolicyConfig::deserialize(deserializer)?;
        let policy = RetryPolicy::new(config.max_attempts, Duration::from_millis(config.delay_ms))
            .map_err(D::Error::custom)?
            .with_backoff(config.backoff);

        Ok(match config.max_delay_ms {
            Some(cap) => policy.with_max_delay(Duration::from_millis(cap)),
            None => policy,
        })
    }
}

fn whole_millis<E: serde::ser::Error>(d: Duration) -> Result<u64, E> {
    if d.subsec_nanos() % 1_000_000 != 0 {
        return Err(E::custom(format_args!(
            "delay {:?} is not a whole number of milliseconds",
            d
        )));
    }
    u64::try_from(d.as_millis())
        .map_err(|_| E::custom(format_args!("delay {:?} does not fit in u64 milliseconds", d)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let policy = RetryPolicy::new(4, Duration::from_millis(250))
            .unwrap()
            .with_backoff(Backoff::Exponential)
            .with_max_delay(Duration::from_secs(2));

        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("\"backoff\":\"exponential\""));
        assert!(json.contains("\"max_delay_ms\":2000"));

        let back: RetryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn sub_millisecond_delay_refuses_to_serialize() {
        let policy = RetryPolicy::new(3, Duration::from_micros(1500)).unwrap();

        let err = serde_json::to_string(&policy).unwrap_err();
        assert!(err.to_string().contains("whole number of milliseconds"));
    }

    #[test]
    fn sub_millisecond_cap_refuses_to_serialize() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10))
            .unwrap()
            .with_max_delay(Duration::from_nanos(2_000_001));

        assert!(serde_json::to_string(&policy).is_err());
    }

    #[test]
    fn oversized_delay_refuses_to_serialize() {
        let policy = RetryPolicy::new(2, Duration::from_secs(u64::MAX)).unwrap();

        let err = serde_json::to_string(&policy).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn whole_millisecond_delays_survive_round_trip() {
        let policy = RetryPolicy::new(3, Duration::from_secs(90))
            .unwrap()
            .with_max_delay(Duration::from_millis(1));

        let json = serde_json::to_string(&policy).unwrap();
        let back: RetryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
        assert_eq!(back.delay(), Duration::from_secs(90));
    }

    #[test]
    fn optional_fields_default() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"max_attempts": 3, "delay_ms": 10}"#).unwrap();
        assert_eq!(policy.backoff(), Backoff::Fixed);
        assert_eq!(policy.max_delay(), None);
        assert_eq!(policy.delay(), Duration::from_millis(10));
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = serde_json::from_str::<RetryPolicy>(r#"{"max_attempts": 0, "delay_ms": 10}"#)
            .unwrap_err();
        assert!(err.to_string().contains("max_attempts must be at least 1"));
    }

    #[test]
    fn unknown_backoff_rejected() {
        let result = serde_json::from_str::<RetryPolicy>(
            r#"{"max_attempts": 3, "delay_ms": 10, "backoff": "fibonacci"}"#,
        );
        assert!(result.is_err());
    }
}
