//! Metrics records around critical actions and plans.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use recovery_metrics::{ActionRecord, Metrics, MetricsError, Observation};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

/// Opens metrics records. A recorder without a sink does nothing.
#[derive(Clone)]
pub struct MetricsRecorder {
    metrics: Option<Arc<dyn Metrics>>,
    hostname: String,
    create_timeout: Duration,
    update_timeout: Duration,
    cancellation: CancellationToken,
}

impl MetricsRecorder {
    /// Build a recorder writing to `metrics`.
    #[must_use]
    pub fn new(
        metrics: Option<Arc<dyn Metrics>>,
        hostname: impl Into<String>,
        create_timeout: Duration,
        update_timeout: Duration,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            metrics,
            hostname: hostname.into(),
            create_timeout,
            update_timeout,
            cancellation,
        }
    }

    /// Create a record of `kind` starting now.
    ///
    /// Returns `None` when no sink is configured or the create call failed;
    /// failures are logged and never reach the caller.
    pub async fn open(&self, kind: String) -> Option<OpenRecord> {
        let metrics = Arc::clone(self.metrics.as_ref()?);
        let mut record = ActionRecord::new(kind)
            .with_hostname(self.hostname.clone())
            .with_start_time(Utc::now());
        let created = bounded(
            &self.cancellation,
            self.create_timeout,
            metrics.create(&mut record),
        )
        .await;
        match created {
            Ok(()) => Some(OpenRecord {
                record,
                metrics,
                update_timeout: self.update_timeout,
                cancellation: self.cancellation.clone(),
            }),
            Err(e) => {
                tracing::warn!(kind = %record.action_kind, error = %e, "failed to create metrics record");
                None
            }
        }
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("enabled", &self.metrics.is_some())
            .field("hostname", &self.hostname)
            .finish_non_exhaustive()
    }
}

/// A created record waiting for its outcome.
pub struct OpenRecord {
    record: ActionRecord,
    metrics: Arc<dyn Metrics>,
    update_timeout: Duration,
    cancellation: CancellationToken,
}

impl OpenRecord {
    /// Attach an observation written on close.
    pub fn observe(&mut self, observation: Observation) {
        self.record.observations.push(observation);
    }

    /// The record as created.
    #[must_use]
    pub fn record(&self) -> &ActionRecord {
        &self.record
    }

    /// Stamp the outcome and submit the update. Failures are logged only.
    pub async fn close(mut self, outcome: &Result<(), EngineError>) {
        let reason = outcome.as_ref().err().map(ToString::to_string);
        self.record.close(Utc::now(), reason);
        let updated = bounded(
            &self.cancellation,
            self.update_timeout,
            self.metrics.update(&mut self.record),
        )
        .await;
        if let Err(e) = updated {
            tracing::warn!(
                kind = %self.record.action_kind,
                name = %self.record.name,
                error = %e,
                "failed to update metrics record"
            );
        }
    }
}

async fn bounded<F>(
    cancellation: &CancellationToken,
    deadline: Duration,
    call: F,
) -> Result<(), MetricsError>
where
    F: Future<Output = Result<(), MetricsError>>,
{
    tokio::select! {
        biased;
        () = cancellation.cancelled() => Err(MetricsError::Unavailable("run cancelled".into())),
        result = tokio::time::timeout(deadline, call) => result.unwrap_or_else(|_| {
            Err(MetricsError::Unavailable(format!(
                "no response within {}",
                humantime_serde::re::humantime::format_duration(deadline)
            )))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recovery_execs::ExecError;
    use recovery_metrics::{ActionStatus, InMemoryMetrics};

    fn recorder(metrics: Option<Arc<dyn Metrics>>) -> MetricsRecorder {
        MetricsRecorder::new(
            metrics,
            "dut-1",
            Duration::from_secs(30),
            Duration::from_secs(30),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn no_sink_is_a_noop() {
        assert!(recorder(None).open("action:a".into()).await.is_none());
    }

    #[tokio::test]
    async fn success_and_failure_status() {
        let store = InMemoryMetrics::new();
        let rec = recorder(Some(store.clone()));

        let open = rec.open("action:a".into()).await.unwrap();
        assert_eq!(open.record().hostname, "dut-1");
        open.close(&Ok(())).await;

        let mut open = rec.open("action:b".into()).await.unwrap();
        open.observe(Observation::int64("restarts", 2));
        open.close(&Err(EngineError::Exec {
            action: "b".into(),
            source: ExecError::failed("sample_fail", "sample fail"),
        }))
        .await;

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, ActionStatus::Success);
        assert!(records[0].stop_time.is_some());
        assert_eq!(records[1].status, ActionStatus::Fail);
        assert!(records[1].fail_reason.contains("sample fail"));
        assert_eq!(records[1].observation("restarts").unwrap().value, "2");
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let store = InMemoryMetrics::new();
        store.set_failing(true);
        assert!(recorder(Some(store.clone())).open("action:a".into()).await.is_none());
        assert!(store.is_empty());
    }
}
