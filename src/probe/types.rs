use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::args::{HttpMethod, Protocol};
use crate::error::TaskError;

use super::transport::ProbeResponse;

/// Status text recorded for attempts that never produced an HTTP response.
const ERROR_STATUS_TEXT: &str = "Error";

/// One (url, protocol, method) combination to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// URL exactly as the caller supplied it.
    pub url: String,
    /// URL after scheme normalization for `protocol`.
    pub full_url: String,
    pub protocol: Protocol,
    pub method: HttpMethod,
}

/// Lifecycle of a task. The last three states are terminal and each yields
/// exactly one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InFlight,
    Completed,
    TimedOut,
    Errored,
}

impl TaskState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::TimedOut | TaskState::Errored
        )
    }
}

/// Recorded outcome of one task.
///
/// `status == 0` marks a transport-level failure, in which case `error` is
/// always set. HTTP error statuses are ordinary completed results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub url: String,
    pub full_url: String,
    pub protocol: Protocol,
    pub method: HttpMethod,
    pub status: u16,
    pub status_text: String,
    pub duration_ms: u64,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub error: Option<String>,
    pub timestamp_utc: String,
    #[serde(skip)]
    pub state: TaskState,
}

impl ProbeResult {
    pub(crate) fn completed(task: Task, response: ProbeResponse, elapsed: Duration) -> Self {
        if response.status == 0 {
            let err = TaskError::Transport {
                message: "Response carried status 0".to_owned(),
            };
            return Self::failed(task, &err, elapsed);
        }
        Self {
            url: task.url,
            full_url: task.full_url,
            protocol: task.protocol,
            method: task.method,
            status: response.status,
            status_text: response.status_text,
            duration_ms: millis(elapsed),
            headers: response.headers,
            body: Some(response.body),
            error: None,
            timestamp_utc: now_utc(),
            state: TaskState::Completed,
        }
    }

    pub(crate) fn failed(task: Task, err: &TaskError, elapsed: Duration) -> Self {
        let state = if err.is_timeout() {
            TaskState::TimedOut
        } else {
            TaskState::Errored
        };
        Self {
            url: task.url,
            full_url: task.full_url,
            protocol: task.protocol,
            method: task.method,
            status: 0,
            status_text: ERROR_STATUS_TEXT.to_owned(),
            duration_ms: millis(elapsed),
            headers: BTreeMap::new(),
            body: Some(format!("{}: {}", err.kind(), err)),
            error: Some(err.to_string()),
            timestamp_utc: now_utc(),
            state,
        }
    }

    /// 2xx and 3xx count as success, matching how rows are colored.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 400
    }

    /// True when no HTTP response was obtained.
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        self.status == 0
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
