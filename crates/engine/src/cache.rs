//! Per-run caches: action results and recovery usage.

use std::collections::HashMap;

use recovery_plan::{Plan, RunControl};

use crate::error::EngineError;

/// Outcome of one action or recovery evaluation.
pub type Outcome = Result<(), EngineError>;

/// Outcome of the last evaluation of each action, keyed by action name.
///
/// Writes are filtered by [`RunControl`]: `ALWAYS_RUN` outcomes are never
/// stored. Entries of `RERUN_AFTER_RECOVERY` actions are dropped before the
/// critical actions start over.
#[derive(Debug, Default, Clone)]
pub struct ActionResultCache {
    results: HashMap<String, Outcome>,
}

impl ActionResultCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached outcome of `action`, if any.
    #[must_use]
    pub fn get(&self, action: &str) -> Option<&Outcome> {
        self.results.get(action)
    }

    /// Whether `action` has a cached outcome.
    #[must_use]
    pub fn contains(&self, action: &str) -> bool {
        self.results.contains_key(action)
    }

    /// Store `outcome` for `action` if its run control allows caching.
    pub fn store(&mut self, action: &str, run_control: RunControl, outcome: Outcome) {
        if run_control.caches_result() {
            self.results.insert(action.to_string(), outcome);
        }
    }

    /// Drop every entry whose action is `RERUN_AFTER_RECOVERY` in `plan`.
    pub fn reset_after_recovery(&mut self, plan: &Plan) {
        self.results.retain(|name, _| {
            plan.action(name)
                .is_none_or(|a| !a.run_control.resets_after_recovery())
        });
    }

    /// Cached action names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.results.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of cached outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Outcome of every recovery attempt, keyed by `(action, recovery)`.
///
/// Entries are never removed during a run, which is what bounds every
/// recovery to one attempt per containing action.
#[derive(Debug, Default, Clone)]
pub struct RecoveryUsageCache {
    usages: HashMap<(String, String), Outcome>,
}

impl RecoveryUsageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `recovery` was used for `action` with `outcome`.
    pub fn register(&mut self, action: &str, recovery: &str, outcome: Outcome) {
        self.usages
            .insert((action.to_string(), recovery.to_string()), outcome);
    }

    /// The recorded outcome of `recovery` for `action`.
    #[must_use]
    pub fn get(&self, action: &str, recovery: &str) -> Option<&Outcome> {
        self.usages.get(&(action.to_string(), recovery.to_string()))
    }

    /// Whether `recovery` was used for `action`.
    #[must_use]
    pub fn contains(&self, action: &str, recovery: &str) -> bool {
        self.get(action, recovery).is_some()
    }

    /// Recorded `(action, recovery)` pairs, sorted.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .usages
            .keys()
            .map(|(a, r)| (a.as_str(), r.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of recorded attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.usages.len()
    }

    /// Whether no recovery was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }
}
