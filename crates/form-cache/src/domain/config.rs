//! Form cache configuration with validation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// What happens to a pending form that is answered while it has no listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Keep the form until it is replaced, discarded or the session ends
    #[default]
    Retain,
    /// Remove the form on the first unmatched reply
    Evict,
}

/// Per-session form cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormCacheConfig {
    /// Optional cap on forms pending at once (default: unbounded)
    pub max_pending: Option<usize>,
    /// Handling of forms answered without a listener
    pub orphan_policy: OrphanPolicy,
}

impl FormCacheConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending == Some(0) {
            return Err(ConfigError::InvalidLimit("max_pending cannot be 0".into()));
        }

        Ok(())
    }

    /// Builder-style method to cap the number of pending forms
    pub fn with_max_pending(mut self, max: usize) -> Self {
        self.max_pending = Some(max);
        self
    }

    /// Builder-style method to set the orphan policy
    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }
}
