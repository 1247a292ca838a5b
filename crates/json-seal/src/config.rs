//! Envelope configuration.

use json_seal_core::ValidatorConfig;

/// Configuration for sealing payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealConfig {
    /// Rules applied to the payload before it is canonicalized.
    pub validator: ValidatorConfig,
    /// Upper bound on the canonical payload size in bytes. `None` is unlimited.
    pub max_payload_bytes: Option<usize>,
}

impl SealConfig {
    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.validator.max_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SealConfig::default();
        assert_eq!(config.validator.max_depth, json_seal_core::validate::DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_payload_bytes, None);

        let config = config.max_payload_bytes(1024).max_depth(8);
        assert_eq!(config.max_payload_bytes, Some(1024));
        assert_eq!(config.validator.max_depth, 8);
    }
}
