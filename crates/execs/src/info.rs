//! Run-wide arguments and the per-call exec context.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use recovery_metrics::Metrics;
use tokio_util::sync::CancellationToken;

use crate::args::ActionArgs;
use crate::error::ExecError;
use crate::registry::ExecRegistry;

/// Arguments shared by every exec in one engine run.
///
/// The engine itself reads only [`enable_recovery`](Self::enable_recovery),
/// [`metrics`](Self::metrics), [`registry`](Self::registry) and
/// [`cancellation`](Self::cancellation). Everything is cheap to clone.
#[derive(Clone)]
pub struct RunArgs {
    /// The resource (device) the plan runs against.
    pub resource_name: String,
    /// Whether recoveries may run for critical actions.
    pub enable_recovery: bool,
    /// Where to record action metrics. `None` disables recording.
    pub metrics: Option<Arc<dyn Metrics>>,
    /// Where exec names are resolved.
    pub registry: Arc<ExecRegistry>,
    /// Cancels the whole run.
    pub cancellation: CancellationToken,
}

impl RunArgs {
    /// Arguments for `resource_name` with recovery enabled, no metrics, and
    /// the global registry.
    #[must_use]
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            enable_recovery: true,
            metrics: None,
            registry: ExecRegistry::global(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Enable or disable recoveries.
    #[must_use]
    pub fn with_recovery(mut self, enable: bool) -> Self {
        self.enable_recovery = enable;
        self
    }

    /// Record metrics into `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Resolve execs in `registry` instead of the global one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ExecRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl Default for RunArgs {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for RunArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunArgs")
            .field("resource_name", &self.resource_name)
            .field("enable_recovery", &self.enable_recovery)
            .field("metrics", &self.metrics.is_some())
            .field("execs", &self.registry.len())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

/// Everything an exec receives for one call.
#[derive(Debug, Clone)]
pub struct ExecInfo {
    /// The run this call belongs to.
    pub run_args: RunArgs,
    /// The exec being called.
    pub exec_name: String,
    /// The action that bound the exec.
    pub action_name: String,
    /// The action's raw extra arguments.
    pub action_args: Vec<String>,
    /// Time the exec is allowed to take.
    pub action_timeout: Duration,
    /// Cancelled when the deadline passes or the run is cancelled.
    pub cancellation: CancellationToken,
}

impl ExecInfo {
    /// Describe a call of `exec_name` for `action_name`.
    ///
    /// The call's token is a child of the run's token.
    #[must_use]
    pub fn new(
        run_args: RunArgs,
        action_name: impl Into<String>,
        exec_name: impl Into<String>,
        action_timeout: Duration,
    ) -> Self {
        let cancellation = run_args.cancellation.child_token();
        Self {
            run_args,
            exec_name: exec_name.into(),
            action_name: action_name.into(),
            action_args: Vec::new(),
            action_timeout,
            cancellation,
        }
    }

    /// Attach the action's raw extra arguments.
    #[must_use]
    pub fn with_action_args(mut self, args: Vec<String>) -> Self {
        self.action_args = args;
        self
    }

    /// Parsed `key:value` arguments.
    #[must_use]
    pub fn args(&self) -> ActionArgs {
        ActionArgs::parse(&self.action_args)
    }

    /// Returns [`ExecError::Cancelled`] once the call has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), ExecError> {
        if self.cancellation.is_cancelled() {
            Err(ExecError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// A failure of this exec.
    pub fn fail(&self, reason: impl Into<String>) -> ExecError {
        ExecError::failed(self.exec_name.clone(), reason)
    }
}
