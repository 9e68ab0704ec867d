//! Plan definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// A recovery plan: an ordered list of critical actions over a graph of
/// named actions.
///
/// The plan succeeds when every critical action succeeds, possibly after
/// recoveries restarted the critical sequence. With [`allow_fail`](Self::allow_fail)
/// set, a failure of the critical sequence is reported as success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    /// Names of the actions defining the plan's success, in execution order.
    pub critical_actions: Vec<String>,
    /// All actions reachable from this plan, keyed by name.
    pub actions: HashMap<String, Action>,
    /// Report a failed critical sequence as success.
    pub allow_fail: bool,
}

impl Plan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the critical action list.
    #[must_use]
    pub fn with_critical_actions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_actions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add or replace an action.
    #[must_use]
    pub fn with_action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Set the plan-level allow-fail policy.
    #[must_use]
    pub fn with_allow_fail(mut self, allow_fail: bool) -> Self {
        self.allow_fail = allow_fail;
        self
    }

    /// Look up an action by name.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Returns `true` if an action with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Action names in sorted order, for deterministic iteration.
    #[must_use]
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
