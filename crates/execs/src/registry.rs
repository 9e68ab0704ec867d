//! Exec registry for looking up execs by name.

use std::future::Future;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::builtin;
use crate::error::ExecError;
use crate::exec::{Exec, FnExec};
use crate::info::ExecInfo;

static GLOBAL: LazyLock<Arc<ExecRegistry>> =
    LazyLock::new(|| Arc::new(ExecRegistry::with_builtins()));

/// Thread-safe registry of execs keyed by name.
///
/// Execs are registered at startup and looked up on every action. Lookups of
/// an unregistered name fail with [`ExecError::NotFound`].
#[derive(Default)]
pub struct ExecRegistry {
    execs: DashMap<String, Arc<dyn Exec>>,
}

impl ExecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            execs: DashMap::new(),
        }
    }

    /// Create a registry holding the built-in execs.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtin::register_all(&registry);
        registry
    }

    /// The process-wide registry, created with the built-ins on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Register an exec. An exec already registered under `name` is replaced.
    pub fn register(&self, name: impl Into<String>, exec: Arc<dyn Exec>) {
        let name = name.into();
        tracing::debug!(exec = %name, "registered exec");
        self.execs.insert(name, exec);
    }

    /// Register an async closure as an exec.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(ExecInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ExecError>> + Send + 'static,
    {
        self.register(name, Arc::new(FnExec::new(f)));
    }

    /// Look up an exec by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Exec>, ExecError> {
        self.execs
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ExecError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Check if an exec is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.execs.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.execs.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered execs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.execs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.execs.is_empty()
    }

    /// Resolve `info.exec_name` and run it.
    pub async fn run(&self, info: &ExecInfo) -> Result<(), ExecError> {
        let exec = self.get(&info.exec_name)?;
        exec.run(info).await
    }
}

impl std::fmt::Debug for ExecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecRegistry")
            .field("execs", &self.names())
            .finish()
    }
}

/// Register an exec in the process-wide registry.
pub fn register_global(name: impl Into<String>, exec: Arc<dyn Exec>) {
    GLOBAL.register(name, exec);
}
