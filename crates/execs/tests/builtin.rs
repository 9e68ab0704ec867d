use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use recovery_execs::{ExecError, ExecInfo, ExecRegistry, RunArgs};

fn info(exec: &str, args: &[&str]) -> ExecInfo {
    let run = RunArgs::new("dut-1").with_registry(Arc::new(ExecRegistry::with_builtins()));
    ExecInfo::new(run, "action", exec, Duration::from_secs(60))
        .with_action_args(args.iter().map(ToString::to_string).collect())
}

#[tokio::test]
async fn sample_pass_and_fail() {
    let pass = info("sample_pass", &[]);
    assert_eq!(pass.run_args.registry.run(&pass).await, Ok(()));

    let fail = info("sample_fail", &[]);
    assert_eq!(
        fail.run_args.registry.run(&fail).await,
        Err(ExecError::failed("sample_fail", "sample fail"))
    );
}

#[tokio::test(start_paused = true)]
async fn sample_sleep_waits_for_duration() {
    let sleep = info("sample_sleep", &["duration:5m"]);
    let start = tokio::time::Instant::now();
    assert_eq!(sleep.run_args.registry.run(&sleep).await, Ok(()));
    assert!(start.elapsed() >= Duration::from_secs(300));
}

#[tokio::test(start_paused = true)]
async fn sample_sleep_stops_on_cancel() {
    let sleep = info("sample_sleep", &["duration:1h"]);
    let token = sleep.cancellation.clone();
    let registry = Arc::clone(&sleep.run_args.registry);
    let task = tokio::spawn(async move { registry.run(&sleep).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    token.cancel();
    assert_eq!(task.await.unwrap(), Err(ExecError::Cancelled));
}

#[tokio::test]
async fn unknown_exec_fails() {
    let missing = info("no_such_exec", &[]);
    assert!(matches!(
        missing.run_args.registry.run(&missing).await,
        Err(ExecError::NotFound { .. })
    ));
}
