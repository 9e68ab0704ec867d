#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Recovery Execs
//!
//! Execs are the bodies of plan actions. An action names its exec; the engine
//! looks the name up in an [`ExecRegistry`] and calls it with an [`ExecInfo`]
//! describing the action and the run.
//!
//! The process-wide registry returned by [`ExecRegistry::global`] starts with
//! the built-in execs (`sample_pass`, `sample_fail`, `sample_sleep`) and is
//! extended at startup with [`register_global`].

pub mod args;
pub mod builtin;
pub mod error;
pub mod exec;
pub mod info;
pub mod registry;

pub use args::ActionArgs;
pub use error::ExecError;
pub use exec::{Exec, FnExec};
pub use info::{ExecInfo, RunArgs};
pub use registry::{ExecRegistry, register_global};
