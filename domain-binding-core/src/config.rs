//! Workflow configuration
//!
//! Passed explicitly into [`ServiceContext`](crate::ServiceContext); nothing here
//! is read from process-wide state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Retry and timeout knobs for the provisioning workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Registrant lookup attempts (first try included).
    pub max_attempts: u32,
    /// Fixed pause between registrant lookup attempts, in milliseconds.
    pub retry_interval_ms: u64,
    /// Deadline for a single certificate/CDN provider call, in seconds.
    pub provider_timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_interval_ms: 1000,
            provider_timeout_secs: 30,
        }
    }
}

impl WorkflowConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Reject values that would disable the lookup or every provider call.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_attempts == 0 {
            return Err(CoreError::ValidationError(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.provider_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "provider_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
