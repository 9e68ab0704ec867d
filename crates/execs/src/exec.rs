//! The exec trait and a closure adapter.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::info::ExecInfo;

/// The body of an action.
///
/// Implementations must honour [`ExecInfo::cancellation`]: the engine does not
/// abort an exec that overruns its deadline, it only cancels the token.
#[async_trait]
pub trait Exec: Send + Sync {
    /// Run the exec.
    async fn run(&self, info: &ExecInfo) -> Result<(), ExecError>;
}

/// Adapts an async closure to [`Exec`].
pub struct FnExec<F> {
    f: F,
}

impl<F> FnExec<F> {
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnExec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExec").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Exec for FnExec<F>
where
    F: Fn(ExecInfo) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ExecError>> + Send,
{
    async fn run(&self, info: &ExecInfo) -> Result<(), ExecError> {
        (self.f)(info.clone()).await
    }
}
