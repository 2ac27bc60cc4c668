//! Transfer tuning.

use core::time::Duration;

use crate::error::{Error, Result};
use crate::{DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_DELAY_MS, MAX_CHUNK_CAPACITY};

/// Tuning of a chunked transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Payload bytes per chunk; every chunk but the last is exactly this long.
    pub chunk_capacity: usize,
    /// Pause after every chunk send. Not adaptive; zero disables pacing.
    pub chunk_delay: Duration,
}

impl TransferConfig {
    /// Returns the default configuration: 1400 byte chunks, 1 ms apart.
    pub const fn new() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            chunk_delay: Duration::from_millis(DEFAULT_CHUNK_DELAY_MS),
        }
    }

    /// Sets the chunk capacity.
    pub fn with_chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity;
        self
    }

    /// Sets the inter-chunk delay.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Checks that the capacity fits in one datagram.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_capacity == 0 || self.chunk_capacity > MAX_CHUNK_CAPACITY {
            return Err(Error::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.chunk_capacity, 1400);
        assert_eq!(config.chunk_delay, Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = TransferConfig::new()
            .with_chunk_capacity(512)
            .with_chunk_delay(Duration::ZERO);
        assert_eq!(config.chunk_capacity, 512);
        assert!(config.chunk_delay.is_zero());

        assert_eq!(
            TransferConfig::new().with_chunk_capacity(0).validate(),
            Err(Error::InvalidCapacity)
        );
        assert_eq!(
            TransferConfig::new()
                .with_chunk_capacity(MAX_CHUNK_CAPACITY + 1)
                .validate(),
            Err(Error::InvalidCapacity)
        );
        assert!(TransferConfig::new()
            .with_chunk_capacity(MAX_CHUNK_CAPACITY)
            .validate()
            .is_ok());
    }
}
