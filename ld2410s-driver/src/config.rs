//! Driver configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ld2410s_protocol::report::DEFAULT_THROTTLE_MS;

/// Quiet period the radar needs after each command frame
pub const DEFAULT_SETTLE_MS: u32 = 50;

/// How long a command may wait for its acknowledgement
pub const DEFAULT_ACK_TIMEOUT_MS: u32 = 1000;

/// Radar driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// Minimum interval between two published periodic readings
    pub throttle_ms: u32,
    /// Minimum interval between two command transmissions
    pub settle_ms: u32,
    /// Give up on an unanswered command after this long; `None` waits forever
    pub ack_timeout_ms: Option<u32>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            ack_timeout_ms: Some(DEFAULT_ACK_TIMEOUT_MS),
        }
    }
}

impl DriverConfig {
    /// Set the report throttle
    pub fn with_throttle_ms(mut self, throttle_ms: u32) -> Self {
        self.throttle_ms = throttle_ms;
        self
    }

    /// Set the inter-command settling delay
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Set (or disable) the acknowledgement timeout
    pub fn with_ack_timeout_ms(mut self, ack_timeout_ms: Option<u32>) -> Self {
        self.ack_timeout_ms = ack_timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.throttle_ms, 1000);
        assert_eq!(config.settle_ms, 50);
        assert_eq!(config.ack_timeout_ms, Some(1000));
    }

    #[test]
    fn test_builders() {
        let config = DriverConfig::default()
            .with_throttle_ms(250)
            .with_settle_ms(100)
            .with_ack_timeout_ms(None);
        assert_eq!(config.throttle_ms, 250);
        assert_eq!(config.settle_ms, 100);
        assert_eq!(config.ack_timeout_ms, None);
    }
}
