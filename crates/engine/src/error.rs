//! Engine error types.

use std::time::Duration;

use recovery_execs::ExecError;
use recovery_plan::PlanError;

/// Errors from the engine layer.
///
/// Errors are `Clone` because the action-result cache keeps the exact error
/// an action failed with and hands it out again on every later visit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// An action name did not resolve in the plan.
    #[error("action {name:?} is not defined in the plan")]
    UnknownAction {
        /// The unresolved name.
        name: String,
    },

    /// The plan failed validation before any action ran.
    #[error("invalid plan: {}", join(.0))]
    InvalidPlan(Vec<PlanError>),

    /// An exec could not be found or reported a failure.
    #[error("action {action:?}: {source}")]
    Exec {
        /// The action whose exec failed.
        action: String,
        /// The exec's error.
        #[source]
        source: ExecError,
    },

    /// An exec did not finish before its deadline.
    #[error("action {action:?}: exec {exec:?} exceeded timeout {}", human(.timeout))]
    Timeout {
        /// The action whose exec timed out.
        action: String,
        /// The exec that timed out.
        exec: String,
        /// The deadline it was given.
        timeout: Duration,
    },

    /// The run was cancelled while an exec was in flight.
    #[error("action {action:?}: run cancelled")]
    Cancelled {
        /// The action whose exec was interrupted.
        action: String,
    },

    /// A dependency of the action failed.
    #[error("action {action:?}: dependency failed: {source}")]
    Dependency {
        /// The action whose dependency failed.
        action: String,
        /// The dependency's error.
        #[source]
        source: Box<EngineError>,
    },

    /// The action failed earlier in this run and was not re-run.
    #[error("action {action:?} (cached): {source}")]
    Cached {
        /// The action.
        action: String,
        /// The error it failed with.
        #[source]
        source: Box<EngineError>,
    },

    /// A recovery succeeded and the critical actions must start over.
    ///
    /// Only the critical-actions loop consumes this.
    #[error("recovery {recovery:?} of action {action:?} succeeded: start over")]
    StartOver {
        /// The action whose exec failed.
        action: String,
        /// The recovery that succeeded.
        recovery: String,
    },

    /// The plan's critical actions failed.
    #[error("plan {plan:?} failed: {source}")]
    Plan {
        /// The plan name.
        plan: String,
        /// Why it failed.
        #[source]
        source: Box<EngineError>,
    },

    /// A configuration lists a plan it does not define.
    #[error("plan {0:?} not found in configuration")]
    PlanNotFound(String),
}

impl EngineError {
    /// Returns `true` for the restart signal raised by a successful recovery.
    #[must_use]
    pub fn is_start_over(&self) -> bool {
        matches!(self, Self::StartOver { .. })
    }

    /// Returns `true` for errors that abort the run regardless of conditions,
    /// allow-fail policies, or the plan's `allow_fail`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::UnknownAction { .. } | Self::InvalidPlan(_) | Self::PlanNotFound(_) => true,
            Self::Plan { source, .. } => source.is_terminal(),
            _ => false,
        }
    }

    /// Returns `true` if the failure came from an exec deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Dependency { source, .. }
            | Self::Cached { source, .. }
            | Self::Plan { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

fn human(duration: &Duration) -> String {
    humantime_serde::re::humantime::format_duration(*duration).to_string()
}

fn join(errors: &[PlanError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
