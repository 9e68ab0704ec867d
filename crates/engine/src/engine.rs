//! Recovery plan executor.

use std::sync::Arc;

use futures::future::BoxFuture;
use recovery_execs::{ExecInfo, RunArgs};
use recovery_metrics::Observation;
use recovery_plan::{Action, ActionGraph, Plan, validate_plan};
use tracing::Instrument;

use crate::cache::{ActionResultCache, Outcome, RecoveryUsageCache};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::MetricsRecorder;
use crate::timeout;

/// Run `plan` once against `args.resource_name` with the default
/// [`EngineConfig`].
pub async fn run(plan_name: &str, plan: Arc<Plan>, args: RunArgs) -> Result<(), EngineError> {
    RecoveryEngine::new(plan_name, plan, args).run().await
}

/// Executes one plan.
///
/// An engine owns the caches of a single run. After [`run`](Self::run)
/// returns, [`action_results`](Self::action_results) and
/// [`recovery_usage`](Self::recovery_usage) show what the run left behind.
#[derive(Debug)]
pub struct RecoveryEngine {
    plan_name: String,
    plan: Arc<Plan>,
    args: RunArgs,
    config: EngineConfig,
    results: ActionResultCache,
    usage: RecoveryUsageCache,
    restarts: u64,
    forgiven_failures: u64,
}

impl RecoveryEngine {
    /// Create an engine for `plan`.
    #[must_use]
    pub fn new(plan_name: impl Into<String>, plan: Arc<Plan>, args: RunArgs) -> Self {
        Self {
            plan_name: plan_name.into(),
            plan,
            args,
            config: EngineConfig::default(),
            results: ActionResultCache::new(),
            usage: RecoveryUsageCache::new(),
            restarts: 0,
            forgiven_failures: 0,
        }
    }

    /// Replace the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the action-result cache, e.g. with outcomes known from elsewhere.
    #[must_use]
    pub fn with_action_results(mut self, results: ActionResultCache) -> Self {
        self.results = results;
        self
    }

    /// The plan name used in logs and metrics.
    #[must_use]
    pub fn plan_name(&self) -> &str {
        &self.plan_name
    }

    /// The action-result cache.
    #[must_use]
    pub fn action_results(&self) -> &ActionResultCache {
        &self.results
    }

    /// The recovery-usage cache.
    #[must_use]
    pub fn recovery_usage(&self) -> &RecoveryUsageCache {
        &self.usage
    }

    /// How many times the critical actions started over in the last run.
    #[must_use]
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// How many failures the plan's `allow_fail` turned into success in the last run.
    #[must_use]
    pub fn forgiven_failures(&self) -> u64 {
        self.forgiven_failures
    }

    /// Run the plan.
    ///
    /// Returns `Ok` when every critical action passed, possibly after
    /// restarts, or when the plan is allowed to fail. Unresolved action names
    /// are returned as-is and are never forgiven. A cancelled run fails like
    /// any other failing exec.
    ///
    /// The caches carry over between calls; the restart and forgiven-failure
    /// tallies do not.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        let span = tracing::info_span!(
            "plan",
            plan = %self.plan_name,
            resource = %self.args.resource_name,
        );
        self.run_plan().instrument(span).await
    }

    async fn run_plan(&mut self) -> Result<(), EngineError> {
        tracing::info!("plan started");
        self.restarts = 0;
        self.forgiven_failures = 0;

        let errors = validate_plan(&self.plan);
        if !errors.is_empty() {
            return Err(EngineError::InvalidPlan(errors));
        }
        if let Ok(graph) = ActionGraph::from_plan(&self.plan)
            && graph.has_cycle()
        {
            tracing::debug!("plan references form a cycle");
        }

        let recorder = MetricsRecorder::new(
            self.args.metrics.clone(),
            self.args.resource_name.clone(),
            self.config.metrics_create_timeout,
            self.config.metrics_update_timeout,
            self.args.cancellation.clone(),
        );
        let plan_record = if self.config.record_plan_metrics {
            recorder.open(format!("plan:{}", self.plan_name)).await
        } else {
            None
        };

        let outcome = self.run_attempts(&recorder).await;

        if let Some(mut record) = plan_record {
            record.observe(Observation::int64("restarts", self.restarts as i64));
            record.observe(Observation::int64(
                "forgiven_failures",
                self.forgiven_failures as i64,
            ));
            record.close(&outcome).await;
        }

        match &outcome {
            Ok(()) => tracing::info!(
                restarts = self.restarts,
                forgiven_failures = self.forgiven_failures,
                "plan finished successfully"
            ),
            Err(e) => tracing::info!(error = %e, restarts = self.restarts, "plan failed"),
        }
        outcome
    }

    async fn run_attempts(&mut self, recorder: &MetricsRecorder) -> Result<(), EngineError> {
        loop {
            let span = tracing::info_span!("attempt", attempt = self.restarts);
            let result = self.run_critical_actions(recorder).instrument(span).await;
            match result {
                Ok(()) => return Ok(()),
                Err(e) if e.is_start_over() => {
                    tracing::info!(reason = %e, "received request to start over");
                    self.results.reset_after_recovery(&self.plan);
                    self.restarts += 1;
                }
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) if self.plan.allow_fail => {
                    tracing::info!(error = %e, "plan failed but is allowed to fail");
                    self.forgiven_failures += 1;
                    return Ok(());
                }
                Err(e) => {
                    return Err(EngineError::Plan {
                        plan: self.plan_name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }
    }

    async fn run_critical_actions(&mut self, recorder: &MetricsRecorder) -> Result<(), EngineError> {
        let plan = Arc::clone(&self.plan);
        let enable_recovery = self.args.enable_recovery;
        for name in &plan.critical_actions {
            let record = recorder.open(format!("action:{name}")).await;
            let outcome = self.run_action(name, enable_recovery).await;
            if let Some(record) = record {
                record.close(&outcome).await;
            }
            outcome?;
        }
        Ok(())
    }

    async fn run_actions(&mut self, names: &[String], enable_recovery: bool) -> Outcome {
        for name in names {
            self.run_action(name, enable_recovery).await?;
        }
        Ok(())
    }

    // Boxed because actions recurse through conditions, dependencies and
    // recoveries.
    fn run_action<'a>(&'a mut self, name: &'a str, enable_recovery: bool) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let plan = Arc::clone(&self.plan);
            let action = plan
                .action(name)
                .ok_or_else(|| EngineError::UnknownAction {
                    name: name.to_string(),
                })?;
            let span = tracing::info_span!("action", action = name);
            let outcome = self
                .evaluate_action(name, action, enable_recovery)
                .instrument(span)
                .await;
            match &outcome {
                Ok(()) => tracing::debug!(action = name, "action finished"),
                Err(e) => tracing::debug!(action = name, error = %e, "action finished with error"),
            }
            outcome
        })
    }

    async fn evaluate_action(&mut self, name: &str, action: &Action, enable_recovery: bool) -> Outcome {
        if let Some(cached) = self.results.get(name).cloned() {
            return match cached {
                Ok(()) => {
                    tracing::info!("pass (cached)");
                    Ok(())
                }
                Err(e) if action.allow_fail_after_recovery => {
                    tracing::info!(error = %e, "fail (cached), ignored as action is allowed to fail");
                    Ok(())
                }
                Err(e) => Err(EngineError::Cached {
                    action: name.to_string(),
                    source: Box::new(e),
                }),
            };
        }

        if !action.conditions.is_empty() {
            let conditions = self
                .run_actions(&action.conditions, false)
                .instrument(tracing::debug_span!("conditions"))
                .await;
            match conditions {
                Ok(()) => tracing::debug!("all conditions passed"),
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => {
                    tracing::info!(reason = %e, "condition failed, skipping");
                    return Ok(());
                }
            }
        }

        if !action.dependencies.is_empty() {
            let dependencies = self
                .run_actions(&action.dependencies, enable_recovery)
                .instrument(tracing::debug_span!("dependencies"))
                .await;
            match dependencies {
                Ok(()) => {}
                Err(e) if e.is_start_over() || e.is_terminal() => return Err(e),
                Err(e) if action.allow_fail_after_recovery => {
                    tracing::info!(error = %e, "dependency failed, ignored as action is allowed to fail");
                    return Ok(());
                }
                Err(e) => {
                    return Err(EngineError::Dependency {
                        action: name.to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        match self.run_action_exec(name, action, enable_recovery).await {
            Ok(()) => {
                tracing::info!("finished successfully");
                Ok(())
            }
            Err(e) if e.is_start_over() || e.is_terminal() => Err(e),
            Err(e) if action.allow_fail_after_recovery => {
                tracing::info!(error = %e, "failed, ignored as action is allowed to fail");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn run_action_exec(&mut self, name: &str, action: &Action, enable_recovery: bool) -> Outcome {
        let deadline = timeout::exec_timeout(action, self.config.default_exec_timeout);
        let info = ExecInfo::new(self.args.clone(), name, action.exec_name.clone(), deadline)
            .with_action_args(action.exec_extra_args.clone());
        let registry = Arc::clone(&self.args.registry);

        match timeout::run_exec(&registry, info).await {
            Ok(()) => {
                self.results.store(name, action.run_control, Ok(()));
                Ok(())
            }
            Err(e) if e.is_terminal() => Err(e),
            Err(e) => {
                if enable_recovery && !action.recovery_actions.is_empty() {
                    tracing::info!(error = %e, "exec failed, starting recovery actions");
                    self.run_recoveries(name, &action.recovery_actions)
                        .instrument(tracing::info_span!("recoveries"))
                        .await?;
                    tracing::info!("no recoveries left to try");
                }
                // Cached only once no recovery succeeded.
                self.results.store(name, action.run_control, Err(e.clone()));
                Err(e)
            }
        }
    }

    async fn run_recoveries(&mut self, name: &str, recoveries: &[String]) -> Outcome {
        for recovery in recoveries {
            if self.is_recovery_used(name, recovery) {
                tracing::debug!(recovery = %recovery, "recovery already used, skipping");
                continue;
            }
            match self.run_actions(std::slice::from_ref(recovery), false).await {
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => {
                    tracing::debug!(recovery = %recovery, error = %e, "recovery failed");
                    self.usage.register(name, recovery, Err(e));
                }
                Ok(()) => {
                    self.usage.register(name, recovery, Ok(()));
                    tracing::info!(recovery = %recovery, "recovery succeeded, request to start over");
                    return Err(EngineError::StartOver {
                        action: name.to_string(),
                        recovery: recovery.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // A recovery that already has a cached result was used elsewhere in the
    // run; that counts as used here too.
    fn is_recovery_used(&mut self, name: &str, recovery: &str) -> bool {
        if let Some(outcome) = self.results.get(recovery).cloned() {
            self.usage.register(name, recovery, outcome);
        }
        self.usage.contains(name, recovery)
    }
}
