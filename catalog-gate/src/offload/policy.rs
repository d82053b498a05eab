//! Background refresh policies and configuration.

use std::time::Duration;

/// Policy for refreshes that take too long.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// No timeout - the refresh runs until completion.
    #[default]
    None,
    /// Abort the refresh after the given duration.
    Cancel(Duration),
    /// Log a warning after the duration but let the refresh finish.
    Warn(Duration),
}

/// Configuration for the [`OffloadManager`](super::OffloadManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffloadConfig {
    /// Timeout policy for spawned refreshes.
    pub timeout_policy: TimeoutPolicy,
    /// Skip a refresh when one for the same key is still running.
    pub deduplicate: bool,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            timeout_policy: TimeoutPolicy::None,
            deduplicate: true,
        }
    }
}

impl OffloadConfig {
    /// Create a new builder for OffloadConfig.
    pub fn builder() -> OffloadConfigBuilder {
        OffloadConfigBuilder::new()
    }
}

/// Builder for OffloadConfig.
#[derive(Debug, Clone)]
pub struct OffloadConfigBuilder {
    config: OffloadConfig,
}

impl Default for OffloadConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OffloadConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: OffloadConfig::default(),
        }
    }

    /// Set timeout policy.
    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.config.timeout_policy = policy;
        self
    }

    /// Set timeout with cancel policy.
    pub fn timeout(self, duration: Duration) -> Self {
        self.timeout_policy(TimeoutPolicy::Cancel(duration))
    }

    /// Enable or disable deduplication by key.
    pub fn deduplicate(mut self, enabled: bool) -> Self {
        self.config.deduplicate = enabled;
        self
    }

    /// Build the OffloadConfig.
    pub fn build(self) -> OffloadConfig {
        self.config
    }
}
