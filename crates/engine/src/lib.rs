#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Recovery Engine
//!
//! Executes a recovery [`Plan`](recovery_plan::Plan) against one resource.
//!
//! The engine walks the plan's critical actions in order. For each action it
//! consults the result cache, evaluates conditions (a failing condition skips
//! the action), runs dependencies, and then runs the action's exec under a
//! deadline. When an exec fails and recovery is enabled, the action's
//! recoveries are tried in order; the first one that succeeds restarts the
//! critical actions from the top. Every recovery is used at most once per
//! action and results are cached per run, so every run terminates even on a
//! cyclic plan.
//!
//! ```text
//! run(plan)
//!   loop
//!     for action in critical_actions
//!       cached?          -> reuse
//!       conditions fail  -> skip
//!       dependencies     -> must pass
//!       exec             -> pass | recoveries -> start over | fail
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod recorder;
pub mod runner;
pub mod timeout;

pub use cache::{ActionResultCache, RecoveryUsageCache};
pub use config::EngineConfig;
pub use engine::{RecoveryEngine, run};
pub use error::EngineError;
pub use runner::{run_configuration, run_configuration_with};
