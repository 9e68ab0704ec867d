//! Built-in execs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::exec::Exec;
use crate::info::ExecInfo;
use crate::registry::ExecRegistry;

/// Name of the exec that always succeeds.
pub const SAMPLE_PASS: &str = "sample_pass";
/// Name of the exec that always fails.
pub const SAMPLE_FAIL: &str = "sample_fail";
/// Name of the exec that sleeps for its `duration` argument.
pub const SAMPLE_SLEEP: &str = "sample_sleep";

const DEFAULT_SLEEP: Duration = Duration::from_secs(1);

pub(crate) fn register_all(registry: &ExecRegistry) {
    registry.register(SAMPLE_PASS, Arc::new(SamplePass));
    registry.register(SAMPLE_FAIL, Arc::new(SampleFail));
    registry.register(SAMPLE_SLEEP, Arc::new(SampleSleep));
}

/// Always succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SamplePass;

#[async_trait]
impl Exec for SamplePass {
    async fn run(&self, _info: &ExecInfo) -> Result<(), ExecError> {
        Ok(())
    }
}

/// Always fails.
#[derive(Debug, Clone, Copy)]
pub struct SampleFail;

#[async_trait]
impl Exec for SampleFail {
    async fn run(&self, info: &ExecInfo) -> Result<(), ExecError> {
        Err(info.fail("sample fail"))
    }
}

/// Sleeps for `duration:<humantime>` (one second by default), stopping early
/// with [`ExecError::Cancelled`] when cancelled.
#[derive(Debug, Clone, Copy)]
pub struct SampleSleep;

#[async_trait]
impl Exec for SampleSleep {
    async fn run(&self, info: &ExecInfo) -> Result<(), ExecError> {
        let duration = info.args().as_duration("duration", DEFAULT_SLEEP);
        tokio::select! {
            () = tokio::time::sleep(duration) => Ok(()),
            () = info.cancellation.cancelled() => Err(ExecError::Cancelled),
        }
    }
}
