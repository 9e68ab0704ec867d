//! Action records and observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome stamped on a record when it is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// Still running, or never closed.
    #[default]
    Unspecified,
    /// Finished without error.
    Success,
    /// Finished with an error.
    Fail,
}

impl ActionStatus {
    /// The wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Success => "success",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single measurement attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// What is measured, e.g. `"restarts"`.
    pub metric_kind: String,
    /// How [`value`](Self::value) should be read, e.g. `"number"`.
    pub value_type: String,
    /// The measured value in its textual form.
    pub value: String,
}

impl Observation {
    /// An integer observation.
    #[must_use]
    pub fn int64(metric_kind: impl Into<String>, value: i64) -> Self {
        Self {
            metric_kind: metric_kind.into(),
            value_type: "number".to_string(),
            value: value.to_string(),
        }
    }
}

/// One record in the metrics store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionRecord {
    /// Store-assigned identity. Empty until created.
    pub name: String,
    /// What the record describes, e.g. `"action:dut_ssh"` or `"plan:repair"`.
    pub action_kind: String,
    /// The resource the work ran against.
    pub hostname: String,
    /// Outcome.
    pub status: ActionStatus,
    /// When the work started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the work finished.
    pub stop_time: Option<DateTime<Utc>>,
    /// Error text when [`status`](Self::status) is [`ActionStatus::Fail`].
    pub fail_reason: String,
    /// Attached measurements.
    pub observations: Vec<Observation>,
}

impl ActionRecord {
    /// A new, unnamed record of the given kind.
    #[must_use]
    pub fn new(action_kind: impl Into<String>) -> Self {
        Self {
            action_kind: action_kind.into(),
            ..Self::default()
        }
    }

    /// Set the resource the work runs against.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the start time.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Stamp the outcome: [`ActionStatus::Success`] when `fail_reason` is
    /// `None`, otherwise [`ActionStatus::Fail`] with the reason recorded.
    pub fn close(&mut self, stop_time: DateTime<Utc>, fail_reason: Option<String>) {
        self.stop_time = Some(stop_time);
        match fail_reason {
            None => self.status = ActionStatus::Success,
            Some(reason) => {
                self.status = ActionStatus::Fail;
                self.fail_reason = reason;
            }
        }
    }

    /// Look up an observation by kind.
    #[must_use]
    pub fn observation(&self, metric_kind: &str) -> Option<&Observation> {
        self.observations
            .iter()
            .find(|o| o.metric_kind == metric_kind)
    }
}
