mod common;

use common::{Lab, records_of};
use pretty_assertions::assert_eq;
use recovery_engine::{EngineConfig, EngineError, run_configuration, run_configuration_with};
use recovery_plan::{Action, Configuration, PLAN_CLOSING, Plan};

fn single(action: &str, exec: &str) -> Plan {
    Plan::new()
        .with_critical_actions([action])
        .with_action(action, Action::new(exec))
}

#[tokio::test]
async fn runs_listed_plans_then_close() {
    let lab = Lab::new();
    let configuration = Configuration::default()
        .with_plan("repair", single("repair_a", "pass"))
        .with_plan(PLAN_CLOSING, single("close_a", "pass"))
        .with_plan("deploy", single("deploy_a", "pass"));

    assert_eq!(run_configuration(&configuration, lab.args()).await, Ok(()));
    assert_eq!(lab.calls(), vec!["repair_a", "deploy_a", "close_a"]);
}

#[tokio::test]
async fn first_failure_stops_but_close_still_runs() {
    let lab = Lab::new();
    let configuration = Configuration::default()
        .with_plan("repair", single("repair_a", "fail"))
        .with_plan("deploy", single("deploy_a", "pass"))
        .with_plan(PLAN_CLOSING, single("close_a", "pass"));

    let err = run_configuration(&configuration, lab.args()).await.unwrap_err();
    assert!(matches!(&err, EngineError::Plan { plan, .. } if plan == "repair"));
    assert_eq!(lab.calls(), vec!["repair_a", "close_a"]);
}

#[tokio::test]
async fn closing_plan_failure_is_ignored() {
    let lab = Lab::new();
    let configuration = Configuration::default()
        .with_plan("repair", single("repair_a", "pass"))
        .with_plan(PLAN_CLOSING, single("close_a", "fail"));

    let (args, metrics) = lab.args_with_metrics();
    assert_eq!(run_configuration(&configuration, args).await, Ok(()));
    assert_eq!(lab.calls(), vec!["repair_a", "close_a"]);

    let close = records_of(&metrics, "plan:close");
    assert_eq!(close.len(), 1);
    assert_eq!(close[0].observation("forgiven_failures").unwrap().value, "1");
}

#[tokio::test]
async fn missing_plan_is_reported() {
    let lab = Lab::new();
    let mut configuration = Configuration::default().with_plan(PLAN_CLOSING, single("close_a", "pass"));
    configuration.plan_names.insert(0, "ghost".into());

    let err = run_configuration_with(&configuration, lab.args(), &EngineConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PlanNotFound("ghost".into()));
    assert_eq!(lab.calls(), vec!["close_a"]);
}

#[tokio::test]
async fn plans_do_not_share_caches() {
    let lab = Lab::new();
    let configuration = Configuration::default()
        .with_plan("first", single("shared", "pass"))
        .with_plan("second", single("shared", "pass"));

    run_configuration(&configuration, lab.args()).await.unwrap();
    assert_eq!(lab.calls(), vec!["shared", "shared"]);
}
