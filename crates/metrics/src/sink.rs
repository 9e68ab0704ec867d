//! The metrics sink trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::MetricsError;
use crate::record::ActionRecord;

/// Range query over stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Only records of this kind. Empty matches every kind.
    pub action_kind: String,
    /// Only records that started at or after this time.
    pub start_time: Option<DateTime<Utc>>,
    /// Only records that started before this time.
    pub stop_time: Option<DateTime<Utc>>,
    /// Maximum number of records. Zero means no limit.
    pub limit: usize,
}

impl Query {
    /// Query records of a single kind.
    #[must_use]
    pub fn kind(action_kind: impl Into<String>) -> Self {
        Self {
            action_kind: action_kind.into(),
            ..Self::default()
        }
    }

    /// Cap the number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict to records starting in `[start, stop)`.
    #[must_use]
    pub fn with_range(mut self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.stop_time = Some(stop);
        self
    }
}

/// Records matching a [`Query`], newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Matching records.
    pub actions: Vec<ActionRecord>,
}

/// An external store for action records.
///
/// Shared via `Arc<dyn Metrics>` between the engine and execs. The engine only
/// calls [`create`](Self::create) and [`update`](Self::update);
/// [`search`](Self::search) is for execs and tooling.
#[async_trait]
pub trait Metrics: Send + Sync {
    /// Persist a new record. The store may assign [`ActionRecord::name`].
    async fn create(&self, action: &mut ActionRecord) -> Result<(), MetricsError>;

    /// Persist a modified record.
    async fn update(&self, action: &mut ActionRecord) -> Result<(), MetricsError>;

    /// Look up records.
    async fn search(&self, query: &Query) -> Result<QueryResult, MetricsError>;
}

/// A sink that accepts everything and stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    /// Create as an `Arc<dyn Metrics>` for dependency injection.
    #[must_use]
    pub fn arc() -> Arc<dyn Metrics> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Metrics for NoopMetrics {
    async fn create(&self, _action: &mut ActionRecord) -> Result<(), MetricsError> {
        Ok(())
    }

    async fn update(&self, _action: &mut ActionRecord) -> Result<(), MetricsError> {
        Ok(())
    }

    async fn search(&self, _query: &Query) -> Result<QueryResult, MetricsError> {
        Ok(QueryResult::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_metrics_is_object_safe() {
        let m: Arc<dyn Metrics> = NoopMetrics::arc();
        let mut record = ActionRecord::new("action:a");
        m.create(&mut record).await.unwrap();
        m.update(&mut record).await.unwrap();
        assert!(m.search(&Query::default()).await.unwrap().actions.is_empty());
        assert!(record.name.is_empty());
    }
}
