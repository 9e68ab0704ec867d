//! Running every plan of a configuration.

use std::sync::Arc;

use recovery_execs::RunArgs;
use recovery_plan::{Configuration, PLAN_CLOSING};

use crate::config::EngineConfig;
use crate::engine::RecoveryEngine;
use crate::error::EngineError;

/// Run `configuration` with the default [`EngineConfig`].
pub async fn run_configuration(
    configuration: &Configuration,
    args: RunArgs,
) -> Result<(), EngineError> {
    run_configuration_with(configuration, args, &EngineConfig::default()).await
}

/// Run the plans listed in `configuration.plan_names`, in order.
///
/// Each plan runs on a fresh engine, so caches do not carry over between
/// plans. The first failing plan stops the sequence. The closing plan
/// (`close`) is skipped in the list and always runs last, with `allow_fail`
/// forced; its outcome is logged and never returned.
pub async fn run_configuration_with(
    configuration: &Configuration,
    args: RunArgs,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    let result = run_listed_plans(configuration, &args, config).await;

    match configuration.plan(PLAN_CLOSING) {
        None => tracing::info!(plan = PLAN_CLOSING, "closing plan not found in configuration"),
        Some(plan) => {
            let plan = Arc::new(plan.clone().with_allow_fail(true));
            let closing = RecoveryEngine::new(PLAN_CLOSING, plan, args.clone())
                .with_config(config.clone())
                .run()
                .await;
            match closing {
                Ok(()) => tracing::debug!(plan = PLAN_CLOSING, "closing plan finished successfully"),
                Err(e) => tracing::debug!(plan = PLAN_CLOSING, error = %e, "closing plan finished with error"),
            }
        }
    }

    match &result {
        Ok(()) => tracing::info!(resource = %args.resource_name, "all plans finished successfully"),
        Err(e) => tracing::info!(resource = %args.resource_name, error = %e, "plans finished with error"),
    }
    result
}

async fn run_listed_plans(
    configuration: &Configuration,
    args: &RunArgs,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    for name in &configuration.plan_names {
        if name == PLAN_CLOSING {
            continue;
        }
        let plan = configuration
            .plan(name)
            .ok_or_else(|| EngineError::PlanNotFound(name.clone()))?;
        RecoveryEngine::new(name.as_str(), Arc::new(plan.clone()), args.clone())
            .with_config(config.clone())
            .run()
            .await?;
    }
    Ok(())
}
