//! A recording exec registry for scenario tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use recovery_execs::{ExecError, ExecInfo, ExecRegistry, RunArgs};
use recovery_metrics::{ActionRecord, InMemoryMetrics};

/// Execs that record every call by action name.
///
/// - `pass` / `fail`: always pass / always fail
/// - `set`: raises the flag named by its `flag:<name>` argument and passes
/// - `check`: passes only while the `flag:<name>` flag is raised
/// - `hang`: waits until cancelled
pub struct Lab {
    pub registry: Arc<ExecRegistry>,
    calls: Arc<Mutex<Vec<String>>>,
    flags: Arc<Mutex<HashSet<String>>>,
}

impl Lab {
    pub fn new() -> Self {
        let _ = recovery_log::init_test();
        let lab = Self {
            registry: Arc::new(ExecRegistry::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            flags: Arc::new(Mutex::new(HashSet::new())),
        };
        lab.register("pass", |_, _| Ok(()));
        lab.register("fail", |info, _| Err(info.fail("device is broken")));
        lab.register("set", |info, flags| {
            flags.lock().insert(info.args().as_string("flag", ""));
            Ok(())
        });
        lab.register("check", |info, flags| {
            if flags.lock().contains(&info.args().as_string("flag", "")) {
                Ok(())
            } else {
                Err(info.fail("flag not raised"))
            }
        });

        let calls = Arc::clone(&lab.calls);
        lab.registry.register_fn("hang", move |info: ExecInfo| {
            calls.lock().push(info.action_name.clone());
            async move {
                info.cancellation.cancelled().await;
                Err(ExecError::Cancelled)
            }
        });
        lab
    }

    fn register<F>(&self, exec: &str, body: F)
    where
        F: Fn(&ExecInfo, &Mutex<HashSet<String>>) -> Result<(), ExecError> + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        let flags = Arc::clone(&self.flags);
        self.registry.register_fn(exec, move |info: ExecInfo| {
            calls.lock().push(info.action_name.clone());
            let result = body(&info, &*flags);
            async move { result }
        });
    }

    /// Run arguments resolving execs in this lab.
    pub fn args(&self) -> RunArgs {
        RunArgs::new("dut-1").with_registry(Arc::clone(&self.registry))
    }

    /// Run arguments that also record metrics.
    pub fn args_with_metrics(&self) -> (RunArgs, Arc<InMemoryMetrics>) {
        let metrics = InMemoryMetrics::new();
        (self.args().with_metrics(metrics.clone()), metrics)
    }

    /// Action names whose exec was called, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn raise(&self, flag: &str) {
        self.flags.lock().insert(flag.to_string());
    }
}

/// Latest records of the given kind, oldest write first.
pub fn records_of(metrics: &InMemoryMetrics, kind: &str) -> Vec<ActionRecord> {
    metrics
        .records()
        .into_iter()
        .filter(|r| r.action_kind == kind)
        .collect()
}
