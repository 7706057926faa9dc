use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::args::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, HttpMethod, Protocol};
use crate::error::{TaskError, ValidationError};
use crate::shutdown::ShutdownReceiver;

use super::plan::build_batch;
use super::transport::ProbeTransport;
use super::types::{ProbeResult, Task, TaskState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Group size, and therefore the cap on tasks in flight.
    pub concurrency: NonZeroUsize,
    /// Per-task deadline measured from task start.
    pub timeout: Duration,
    /// Prepended to the full URL on the wire; results keep the plain URL.
    pub proxy_prefix: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            timeout: DEFAULT_TIMEOUT,
            proxy_prefix: None,
        }
    }
}

pub struct BatchRunner<T: ?Sized> {
    transport: Arc<T>,
    config: RunnerConfig,
}

impl<T> BatchRunner<T>
where
    T: ProbeTransport + ?Sized + 'static,
{
    #[must_use]
    pub const fn new(transport: Arc<T>, config: RunnerConfig) -> Self {
        Self { transport, config }
    }

    /// Validates the inputs and starts the batch on the current tokio runtime.
    ///
    /// Results arrive on the returned channel as each task settles; the channel
    /// closes once the batch is done. A signal on `shutdown_rx` stops new groups
    /// from starting while the group in flight drains.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyInputSet` before any request is made
    /// when `urls`, `protocols`, or `methods` is empty.
    pub fn run(
        &self,
        urls: &[String],
        protocols: &[Protocol],
        methods: &[HttpMethod],
        shutdown_rx: Option<ShutdownReceiver>,
    ) -> Result<mpsc::Receiver<ProbeResult>, ValidationError> {
        let tasks = build_batch(urls, protocols, methods)?;
        let (results_tx, results_rx) = mpsc::channel(self.config.concurrency.get());
        let transport = Arc::clone(&self.transport);
        let config = self.config.clone();
        tokio::spawn(async move {
            run_batch(transport.as_ref(), &config, tasks, &results_tx, shutdown_rx).await;
        });
        Ok(results_rx)
    }
}

async fn run_batch<T>(
    transport: &T,
    config: &RunnerConfig,
    tasks: Vec<Task>,
    results_tx: &mpsc::Sender<ProbeResult>,
    mut shutdown_rx: Option<ShutdownReceiver>,
) where
    T: ProbeTransport + ?Sized,
{
    let total = tasks.len();
    let group_size = config.concurrency.get();
    info!(
        "Probing {} task(s) in groups of {} (timeout {}ms).",
        total,
        group_size,
        config.timeout.as_millis()
    );

    let mut remaining = tasks.into_iter();
    let mut emitted: usize = 0;
    let mut group_index: usize = 0;
    loop {
        let group: Vec<Task> = remaining.by_ref().take(group_size).collect();
        if group.is_empty() {
            break;
        }
        if shutdown_requested(&mut shutdown_rx) {
            info!(
                state = ?TaskState::Pending,
                "Shutdown requested; {} task(s) not started.",
                total.saturating_sub(emitted)
            );
            break;
        }

        debug!(group = group_index, size = group.len(), "Starting group");
        let mut in_flight: FuturesUnordered<_> = group
            .into_iter()
            .map(|task| execute_task(transport, config, task))
            .collect();

        let mut receiver_open = true;
        while let Some(result) = in_flight.next().await {
            emitted = emitted.saturating_add(1);
            if receiver_open && results_tx.send(result).await.is_err() {
                debug!("Result receiver dropped; finishing current group.");
                receiver_open = false;
            }
        }
        if !receiver_open {
            break;
        }
        group_index = group_index.saturating_add(1);
    }

    info!("Batch finished: {} of {} task(s) settled.", emitted, total);
}

async fn execute_task<T>(transport: &T, config: &RunnerConfig, task: Task) -> ProbeResult
where
    T: ProbeTransport + ?Sized,
{
    let wire_url = match config.proxy_prefix.as_deref() {
        Some(prefix) => format!("{}{}", prefix, task.full_url),
        None => task.full_url.clone(),
    };
    debug!(
        url = %task.full_url,
        method = %task.method,
        state = ?TaskState::InFlight,
        "Task started"
    );

    let started = Instant::now();
    let outcome = match timeout(config.timeout, transport.execute(task.method, &wire_url)).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(TaskError::Timeout {
            timeout_ms: u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    };
    let elapsed = started.elapsed();

    let result = match outcome {
        Ok(response) => ProbeResult::completed(task, response, elapsed),
        Err(err) => {
            warn!("{} {} failed: {}", task.method, task.full_url, err);
            ProbeResult::failed(task, &err, elapsed)
        }
    };
    debug!(
        url = %result.full_url,
        method = %result.method,
        status = result.status,
        state = ?result.state,
        duration_ms = result.duration_ms,
        "Task settled"
    );
    result
}

fn shutdown_requested(shutdown_rx: &mut Option<ShutdownReceiver>) -> bool {
    let Some(receiver) = shutdown_rx.as_mut() else {
        return false;
    };
    match receiver.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) => false,
        Err(TryRecvError::Closed) => {
            *shutdown_rx = None;
            false
        }
    }
}
