//! Action definition and run-control policy.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Run control applied when an action does not set one.
pub const DEFAULT_RUN_CONTROL: RunControl = RunControl::RunOnce;

/// Controls whether an action's result is cached, and whether the cached
/// result survives a plan restart triggered by a successful recovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunControl {
    /// Cache the result for the whole run.
    #[default]
    RunOnce,
    /// Cache the result, but forget it when the plan starts over.
    RerunAfterRecovery,
    /// Never cache; re-evaluate on every visit.
    AlwaysRun,
}

impl RunControl {
    /// Returns `true` if outcomes of actions with this policy are cached.
    #[must_use]
    pub fn caches_result(self) -> bool {
        !matches!(self, Self::AlwaysRun)
    }

    /// Returns `true` if cached outcomes are dropped before a restart.
    #[must_use]
    pub fn resets_after_recovery(self) -> bool {
        matches!(self, Self::RerunAfterRecovery)
    }
}

impl fmt::Display for RunControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunOnce => write!(f, "RUN_ONCE"),
            Self::RerunAfterRecovery => write!(f, "RERUN_AFTER_RECOVERY"),
            Self::AlwaysRun => write!(f, "ALWAYS_RUN"),
        }
    }
}

/// A named node of a plan.
///
/// The name is not stored on the action itself: it is the key under which the
/// action lives in [`Plan::actions`](crate::Plan::actions), and it is the
/// action's identity everywhere the engine refers to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Free-form documentation. Ignored by the engine.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// Key into the exec registry. Empty means the action always passes.
    pub exec_name: String,
    /// Extra arguments handed to the exec, conventionally `key:value`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exec_extra_args: Vec<String>,
    /// Upper bound on a single exec call. The engine default applies when unset.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub exec_timeout: Option<Duration>,
    /// Actions that must all pass for this action to be applicable.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    /// Actions that must pass before this action's exec runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Actions tried, in order, when this action's exec fails.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recovery_actions: Vec<String>,
    /// Downgrade a terminal failure of this action to success at its call site.
    pub allow_fail_after_recovery: bool,
    /// Caching policy.
    pub run_control: RunControl,
}

impl Action {
    /// Create an action bound to the given exec.
    pub fn new(exec_name: impl Into<String>) -> Self {
        Self {
            exec_name: exec_name.into(),
            ..Self::default()
        }
    }

    /// Create an action without an exec. It always passes once its
    /// conditions and dependencies do.
    #[must_use]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Set the condition list.
    #[must_use]
    pub fn with_conditions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the dependency list.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the recovery list.
    #[must_use]
    pub fn with_recoveries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recovery_actions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the exec extra arguments.
    #[must_use]
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exec_extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the exec timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.exec_timeout = Some(timeout);
        self
    }

    /// Set the run-control policy.
    #[must_use]
    pub fn with_run_control(mut self, run_control: RunControl) -> Self {
        self.run_control = run_control;
        self
    }

    /// Allow this action to fail after its recoveries are exhausted.
    #[must_use]
    pub fn allow_fail_after_recovery(mut self) -> Self {
        self.allow_fail_after_recovery = true;
        self
    }

    /// Returns `true` if the action has no exec bound.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.exec_name.is_empty()
    }

    /// Every action name this action refers to, in evaluation order:
    /// conditions, then dependencies, then recoveries.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .chain(&self.dependencies)
            .chain(&self.recovery_actions)
            .map(String::as_str)
    }
}
