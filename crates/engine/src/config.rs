//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deadline applied to execs of actions that do not set `exec_timeout`.
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for creating and for updating a metrics record.
pub const DEFAULT_METRICS_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables of a [`RecoveryEngine`](crate::RecoveryEngine).
///
/// Durations (de)serialize as humantime strings such as `"60s"` or `"2m"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Exec deadline for actions without their own.
    #[serde(with = "humantime_serde")]
    pub default_exec_timeout: Duration,
    /// Deadline for creating a metrics record.
    #[serde(with = "humantime_serde")]
    pub metrics_create_timeout: Duration,
    /// Deadline for closing a metrics record.
    #[serde(with = "humantime_serde")]
    pub metrics_update_timeout: Duration,
    /// Write a `plan:<name>` record around each plan run.
    pub record_plan_metrics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_exec_timeout: DEFAULT_EXEC_TIMEOUT,
            metrics_create_timeout: DEFAULT_METRICS_TIMEOUT,
            metrics_update_timeout: DEFAULT_METRICS_TIMEOUT,
            record_plan_metrics: true,
        }
    }
}

impl EngineConfig {
    /// Set the default exec deadline.
    #[must_use]
    pub fn with_default_exec_timeout(mut self, timeout: Duration) -> Self {
        self.default_exec_timeout = timeout;
        self
    }

    /// Set the metrics create deadline.
    #[must_use]
    pub fn with_metrics_create_timeout(mut self, timeout: Duration) -> Self {
        self.metrics_create_timeout = timeout;
        self
    }

    /// Set the metrics update deadline.
    #[must_use]
    pub fn with_metrics_update_timeout(mut self, timeout: Duration) -> Self {
        self.metrics_update_timeout = timeout;
        self
    }

    /// Enable or disable the per-plan metrics record.
    #[must_use]
    pub fn with_plan_metrics(mut self, enabled: bool) -> Self {
        self.record_plan_metrics = enabled;
        self
    }
}
