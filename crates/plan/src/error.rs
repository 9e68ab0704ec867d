//! Plan and configuration error types.

use std::fmt;

use thiserror::Error;

/// Where a reference to another action appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Listed in the plan's critical actions.
    Critical,
    /// Listed in an action's conditions.
    Condition,
    /// Listed in an action's dependencies.
    Dependency,
    /// Listed in an action's recovery actions.
    Recovery,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical action"),
            Self::Condition => write!(f, "condition"),
            Self::Dependency => write!(f, "dependency"),
            Self::Recovery => write!(f, "recovery action"),
        }
    }
}

/// A structural problem in a plan or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A critical action name does not resolve in the plan.
    #[error("critical action {name:?} is not defined")]
    UnknownCriticalAction {
        /// The unresolved name.
        name: String,
    },

    /// An action refers to a name that does not resolve in the plan.
    #[error("action {action:?}: {kind} {name:?} is not defined")]
    UnknownReference {
        /// The action holding the reference.
        action: String,
        /// Which list the reference appears in.
        kind: ReferenceKind,
        /// The unresolved name.
        name: String,
    },

    /// An action binds an exec that is not registered.
    #[error("action {action:?}: exec {exec:?} is not registered")]
    UnknownExec {
        /// The action binding the exec.
        action: String,
        /// The unknown exec name.
        exec: String,
    },

    /// An action sets a zero exec timeout.
    #[error("action {action:?}: exec timeout must be positive")]
    ZeroTimeout {
        /// The offending action.
        action: String,
    },

    /// The configuration does not define any plan.
    #[error("configuration has no plans")]
    NoPlans,

    /// The configuration lists a plan it does not define.
    #[error("plan {0:?} is listed but not defined")]
    PlanNotFound(String),

    /// An issue found inside a named plan.
    #[error("plan {plan:?}: {source}")]
    InPlan {
        /// The plan the issue belongs to.
        plan: String,
        /// The issue.
        #[source]
        source: Box<PlanError>,
    },
}

impl PlanError {
    /// Attach a plan name to this error.
    #[must_use]
    pub fn in_plan(self, plan: impl Into<String>) -> Self {
        Self::InPlan {
            plan: plan.into(),
            source: Box::new(self),
        }
    }
}

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read.
    #[error("read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid configuration JSON.
    #[error("parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but failed validation.
    #[error("invalid configuration: {}", join(.0))]
    Invalid(Vec<PlanError>),
}

fn join(errors: &[PlanError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
