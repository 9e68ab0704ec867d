#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Recovery Metrics
//!
//! The contract between the recovery engine and an external metrics store.
//!
//! The engine writes one [`ActionRecord`] per critical action and one per plan
//! through the [`Metrics`] trait. The store may assign a name on create and may
//! treat updates as appends. [`InMemoryMetrics`] keeps every snapshot in memory
//! and is what tests and the CLI use when no remote store is configured.

pub mod error;
pub mod memory;
pub mod record;
pub mod sink;

pub use error::MetricsError;
pub use memory::InMemoryMetrics;
pub use record::{ActionRecord, ActionStatus, Observation};
pub use sink::{Metrics, NoopMetrics, Query, QueryResult};
