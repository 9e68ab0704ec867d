//! In-memory metrics store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::MetricsError;
use crate::record::ActionRecord;
use crate::sink::{Metrics, Query, QueryResult};

/// Append-only in-memory store.
///
/// Every create and every update appends a snapshot of the record, so the full
/// history of each record stays visible. Names are assigned on create as
/// `action-<n>`. [`set_failing`](Self::set_failing) makes every call return
/// [`MetricsError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    inner: Mutex<Inner>,
    failing: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    snapshots: Vec<ActionRecord>,
    next_id: u64,
}

impl InMemoryMetrics {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail, or succeed again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every snapshot in the order it was written.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ActionRecord> {
        self.inner.lock().snapshots.clone()
    }

    /// The latest snapshot of each record, in the order records were created.
    #[must_use]
    pub fn records(&self) -> Vec<ActionRecord> {
        let inner = self.inner.lock();
        let mut order = Vec::new();
        let mut latest = HashMap::new();
        for snapshot in &inner.snapshots {
            if latest.insert(snapshot.name.as_str(), snapshot).is_none() {
                order.push(snapshot.name.as_str());
            }
        }
        order.into_iter().map(|name| latest[name].clone()).collect()
    }

    /// Number of snapshots written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().snapshots.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().snapshots.is_empty()
    }

    // Newest record first, one entry per name.
    fn latest(&self) -> Vec<ActionRecord> {
        let inner = self.inner.lock();
        let mut seen = HashSet::new();
        inner
            .snapshots
            .iter()
            .rev()
            .filter(|r| seen.insert(r.name.clone()))
            .cloned()
            .collect()
    }

    fn check(&self) -> Result<(), MetricsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MetricsError::Unavailable("in-memory store set to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Metrics for InMemoryMetrics {
    async fn create(&self, action: &mut ActionRecord) -> Result<(), MetricsError> {
        self.check()?;
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        action.name = format!("action-{}", inner.next_id);
        inner.snapshots.push(action.clone());
        tracing::trace!(name = %action.name, kind = %action.action_kind, "metrics record created");
        Ok(())
    }

    async fn update(&self, action: &mut ActionRecord) -> Result<(), MetricsError> {
        self.check()?;
        if action.name.is_empty() {
            return Err(MetricsError::Unnamed);
        }
        let mut inner = self.inner.lock();
        if !inner.snapshots.iter().any(|r| r.name == action.name) {
            return Err(MetricsError::NotFound {
                name: action.name.clone(),
            });
        }
        inner.snapshots.push(action.clone());
        tracing::trace!(name = %action.name, status = %action.status, "metrics record updated");
        Ok(())
    }

    async fn search(&self, query: &Query) -> Result<QueryResult, MetricsError> {
        self.check()?;
        let matches = self.latest().into_iter().filter(|r| {
            (query.action_kind.is_empty() || r.action_kind == query.action_kind)
                && query
                    .start_time
                    .is_none_or(|from| r.start_time.is_some_and(|t| t >= from))
                && query
                    .stop_time
                    .is_none_or(|to| r.start_time.is_some_and(|t| t < to))
        });
        let actions = if query.limit == 0 {
            matches.collect()
        } else {
            matches.take(query.limit).collect()
        };
        Ok(QueryResult { actions })
    }
}
