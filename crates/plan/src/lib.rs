#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Recovery Plan
//!
//! The declarative model read by the recovery engine.
//!
//! A [`Plan`] names an ordered list of critical actions and a map of
//! [`Action`]s. Each action binds an exec by name and may reference other
//! actions as conditions, dependencies, or recoveries. This crate provides:
//!
//! - [`Plan`], [`Action`] and [`RunControl`]: immutable value types
//! - [`Configuration`]: the set of plans loaded from a JSON document
//! - [`validate_plan`] and [`validate_configuration`]: multi-error validation
//! - [`ActionGraph`] (a `petgraph` wrapper): cycle and reachability analysis
//!
//! The model carries no behaviour; execution lives in `recovery-engine`.

pub mod action;
pub mod configuration;
pub mod error;
pub mod graph;
pub mod plan;
pub mod validate;

pub use action::{Action, DEFAULT_RUN_CONTROL, RunControl};
pub use configuration::{Configuration, PLAN_CLOSING};
pub use error::{ConfigError, PlanError, ReferenceKind};
pub use graph::ActionGraph;
pub use plan::Plan;
pub use validate::{validate_configuration, validate_plan, validate_plan_with_execs};
