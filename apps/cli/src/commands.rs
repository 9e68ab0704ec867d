use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use recovery_engine::run_configuration_with;
use recovery_execs::{ExecRegistry, RunArgs};
use recovery_metrics::InMemoryMetrics;
use recovery_plan::{ActionGraph, Configuration, PLAN_CLOSING};
use tokio_util::sync::CancellationToken;

use crate::cli::{RunCommand, ValidateCommand};
use crate::settings::Settings;

fn load_configuration(path: &Path, registry: &ExecRegistry) -> Result<Configuration> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Configuration::load(BufReader::new(file), |exec| registry.contains(exec))
        .with_context(|| format!("load {}", path.display()))
}

pub async fn run(settings: Settings, cmd: RunCommand) -> Result<()> {
    let registry = ExecRegistry::global();
    let mut configuration = load_configuration(&cmd.plans, &registry)?;
    if !cmd.plan.is_empty() {
        configuration.plan_names = cmd.plan;
    }

    let cancellation = CancellationToken::new();
    tokio::spawn({
        let token = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling run");
                token.cancel();
            }
        }
    });

    let mut args = RunArgs::new(settings.resource.as_str())
        .with_recovery(settings.enable_recovery)
        .with_registry(registry)
        .with_cancellation(cancellation);
    let metrics = settings.metrics_file.as_ref().map(|_| InMemoryMetrics::new());
    if let Some(metrics) = &metrics {
        args = args.with_metrics(metrics.clone());
    }

    tracing::info!(
        resource = %settings.resource,
        plans = ?configuration.plan_names,
        recovery = settings.enable_recovery,
        "starting run"
    );
    let result = run_configuration_with(&configuration, args, &settings.engine).await;

    if let (Some(path), Some(metrics)) = (&settings.metrics_file, &metrics) {
        let json = serde_json::to_string_pretty(&metrics.records())?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }

    result.with_context(|| format!("recovery of {} failed", settings.resource))
}

pub fn validate(cmd: &ValidateCommand) -> Result<()> {
    let registry = ExecRegistry::global();
    let configuration = load_configuration(&cmd.plans, &registry)?;

    let closing = configuration
        .plan(PLAN_CLOSING)
        .map(|_| PLAN_CLOSING.to_string());
    let names = configuration
        .plan_names
        .iter()
        .filter(|name| name.as_str() != PLAN_CLOSING)
        .cloned()
        .chain(closing);

    for name in names {
        let Some(plan) = configuration.plan(&name) else {
            continue;
        };
        let graph = ActionGraph::from_plan(plan)?;
        println!(
            "{name}: critical actions {}, actions {}, references {}",
            plan.critical_actions.len(),
            graph.node_count(),
            graph.edge_count()
        );
        if graph.has_cycle() {
            println!("  note: actions reference each other in a cycle");
        }
        let unreachable = graph.unreachable_actions();
        if !unreachable.is_empty() {
            println!("  note: unreachable actions: {}", unreachable.join(", "));
        }
    }
    println!("{} is valid", cmd.plans.display());
    Ok(())
}

pub fn execs() {
    for name in ExecRegistry::global().names() {
        println!("{name}");
    }
}

