//! End-to-end scenarios: return value, exec call order, final caches and
//! metrics records.

mod common;

use std::sync::Arc;

use common::{Lab, records_of};
use pretty_assertions::assert_eq;
use recovery_engine::{EngineError, RecoveryEngine};
use recovery_metrics::ActionStatus;
use recovery_plan::{Action, Plan};

fn engine(plan: Plan, args: recovery_execs::RunArgs) -> RecoveryEngine {
    RecoveryEngine::new("scenario", Arc::new(plan), args)
}

#[tokio::test]
async fn trivial_pass() {
    let lab = Lab::new();
    let (args, metrics) = lab.args_with_metrics();
    let plan = Plan::new()
        .with_critical_actions(["a"])
        .with_action("a", Action::new("pass"));

    let mut engine = engine(plan, args);
    assert_eq!(engine.run().await, Ok(()));

    assert_eq!(lab.calls(), vec!["a"]);
    assert_eq!(engine.action_results().names(), vec!["a"]);
    assert!(engine.recovery_usage().is_empty());

    let actions = records_of(&metrics, "action:a");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].status, ActionStatus::Success);
    assert_eq!(actions[0].hostname, "dut-1");

    let plans = records_of(&metrics, "plan:scenario");
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].status, ActionStatus::Success);
    assert_eq!(plans[0].observation("restarts").unwrap().value, "0");
    assert_eq!(plans[0].observation("forgiven_failures").unwrap().value, "0");
}

fn pass_then_fail() -> Plan {
    Plan::new()
        .with_critical_actions(["a", "b"])
        .with_action("a", Action::new("pass"))
        .with_action("b", Action::new("fail"))
}

#[tokio::test]
async fn critical_failure_not_allowed() {
    let lab = Lab::new();
    let (args, metrics) = lab.args_with_metrics();

    let mut engine = engine(pass_then_fail(), args);
    let err = engine.run().await.unwrap_err();

    assert!(matches!(&err, EngineError::Plan { plan, .. } if plan == "scenario"));
    assert!(err.to_string().contains("device is broken"), "{err}");
    assert_eq!(lab.calls(), vec!["a", "b"]);
    assert_eq!(engine.action_results().names(), vec!["a", "b"]);
    assert!(engine.action_results().get("a").unwrap().is_ok());
    assert!(engine.action_results().get("b").unwrap().is_err());

    assert_eq!(records_of(&metrics, "action:a")[0].status, ActionStatus::Success);
    let b = &records_of(&metrics, "action:b")[0];
    assert_eq!(b.status, ActionStatus::Fail);
    assert!(b.fail_reason.contains("device is broken"));
    assert_eq!(records_of(&metrics, "plan:scenario")[0].status, ActionStatus::Fail);
}

#[tokio::test]
async fn critical_failure_allowed() {
    let lab = Lab::new();
    let (args, metrics) = lab.args_with_metrics();

    let mut engine = engine(pass_then_fail().with_allow_fail(true), args);
    assert_eq!(engine.run().await, Ok(()));

    assert_eq!(lab.calls(), vec!["a", "b"]);
    assert_eq!(engine.forgiven_failures(), 1);
    assert_eq!(records_of(&metrics, "action:b")[0].status, ActionStatus::Fail);

    let plan = &records_of(&metrics, "plan:scenario")[0];
    assert_eq!(plan.status, ActionStatus::Success);
    assert_eq!(plan.observation("forgiven_failures").unwrap().value, "1");
}

#[tokio::test]
async fn skip_via_failing_condition() {
    let lab = Lab::new();
    let (args, metrics) = lab.args_with_metrics();
    let plan = Plan::new()
        .with_critical_actions(["a"])
        .with_action("a", Action::new("fail").with_conditions(["c1"]))
        .with_action("c1", Action::new("fail"));

    let mut engine = engine(plan, args);
    assert_eq!(engine.run().await, Ok(()));

    assert_eq!(lab.calls(), vec!["c1"]);
    assert_eq!(engine.action_results().names(), vec!["c1"]);
    assert!(!engine.action_results().contains("a"));
    assert_eq!(records_of(&metrics, "action:a")[0].status, ActionStatus::Success);
    assert!(records_of(&metrics, "action:c1").is_empty());
}

fn with_recoveries(r2_exec: &str) -> Plan {
    Plan::new()
        .with_critical_actions(["a"])
        .with_action(
            "a",
            Action::new("check")
                .with_extra_args(["flag:fixed"])
                .with_recoveries(["r1", "r2", "r3"]),
        )
        .with_action("r1", Action::new("fail"))
        .with_action("r2", Action::new(r2_exec).with_extra_args(["flag:fixed"]))
        .with_action("r3", Action::new("fail"))
}

#[tokio::test]
async fn recovery_restart() {
    let lab = Lab::new();
    let (args, metrics) = lab.args_with_metrics();

    let mut engine = engine(with_recoveries("set"), args);
    assert_eq!(engine.run().await, Ok(()));

    assert_eq!(lab.calls(), vec!["a", "r1", "r2", "a"]);
    assert_eq!(engine.restarts(), 1);
    assert_eq!(engine.action_results().names(), vec!["a", "r1", "r2"]);
    assert!(engine.action_results().get("a").unwrap().is_ok());
    assert!(engine.action_results().get("r1").unwrap().is_err());
    assert_eq!(
        engine.recovery_usage().pairs(),
        vec![("a", "r1"), ("a", "r2")]
    );

    let statuses: Vec<ActionStatus> = metrics
        .records()
        .into_iter()
        .filter(|r| r.action_kind == "action:a")
        .map(|r| r.status)
        .collect();
    assert_eq!(statuses, vec![ActionStatus::Fail, ActionStatus::Success]);
    let plan = &records_of(&metrics, "plan:scenario")[0];
    assert_eq!(plan.observation("restarts").unwrap().value, "1");
}

#[tokio::test]
async fn recovery_exhaustion() {
    let lab = Lab::new();
    let (args, metrics) = lab.args_with_metrics();

    let mut engine = engine(with_recoveries("fail"), args);
    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, EngineError::Plan { .. }));
    assert_eq!(lab.calls(), vec!["a", "r1", "r2", "r3"]);
    assert_eq!(engine.restarts(), 0);
    assert_eq!(engine.action_results().names(), vec!["a", "r1", "r2", "r3"]);
    assert!(
        engine
            .action_results()
            .names()
            .iter()
            .all(|name| engine.action_results().get(name).unwrap().is_err())
    );
    assert_eq!(
        engine.recovery_usage().pairs(),
        vec![("a", "r1"), ("a", "r2"), ("a", "r3")]
    );
    assert_eq!(records_of(&metrics, "action:a")[0].status, ActionStatus::Fail);
    assert_eq!(records_of(&metrics, "plan:scenario")[0].status, ActionStatus::Fail);
}
