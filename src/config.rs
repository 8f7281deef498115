//! Pacing configuration for bulk provisioning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry and delay settings used by [`Provisioner`](crate::Provisioner).
///
/// The defaults keep a bulk run under the provider's rate limit: three attempts
/// per address, exponential backoff starting at 5s on HTTP 429, a flat 3s
/// between transport retries and 5s between addresses.
///
/// Durations serialize as integer milliseconds:
///
/// ```
/// use mailtm_client::ProvisionConfig;
///
/// let config: ProvisionConfig = serde_json::from_str(r#"{ "inter_item_delay": 1000 }"#).unwrap();
/// assert_eq!(config.inter_item_delay.as_millis(), 1000);
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Attempts per address, shared by rate-limit and transport retries.
    pub max_attempts: u32,
    /// First rate-limit wait; doubled on every subsequent attempt.
    #[serde(with = "millis")]
    pub rate_limit_base: Duration,
    /// Wait after a request that got no response.
    #[serde(with = "millis")]
    pub transport_retry_delay: Duration,
    /// Wait between two consecutive addresses.
    #[serde(with = "millis")]
    pub inter_item_delay: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_base: Duration::from_millis(5000),
            transport_retry_delay: Duration::from_millis(3000),
            inter_item_delay: Duration::from_millis(5000),
        }
    }
}

impl ProvisionConfig {
    /// Config with every delay set to zero. Attempts stay at the default.
    pub fn without_delays() -> Self {
        Self {
            rate_limit_base: Duration::ZERO,
            transport_retry_delay: Duration::ZERO,
            inter_item_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Backoff after the rate-limited attempt with zero-based index `attempt`.
    pub fn rate_limit_wait(&self, attempt: u32) -> Duration {
        self.rate_limit_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_waits_double_from_five_seconds() {
        let config = ProvisionConfig::default();
        let waits: Vec<u128> = (0..3).map(|i| config.rate_limit_wait(i).as_millis()).collect();
        assert_eq!(waits, vec![5000, 10000, 20000]);
    }

    #[test]
    fn serializes_durations_as_millis() {
        let value = serde_json::to_value(ProvisionConfig::default()).unwrap();
        assert_eq!(value["rate_limit_base"], 5000);
        assert_eq!(value["transport_retry_delay"], 3000);
        assert_eq!(value["inter_item_delay"], 5000);
        assert_eq!(value["max_attempts"], 3);

        let back: ProvisionConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, ProvisionConfig::default());
    }

    #[test]
    fn without_delays_keeps_attempts() {
        let config = ProvisionConfig::without_delays();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.rate_limit_wait(2), Duration::ZERO);
    }
}
