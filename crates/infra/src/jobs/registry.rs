//! Job queue & stream multiplexer
//!
//! An explicitly owned registry: constructed once at startup, held in app
//! state, no process-global tables. A single background worker consumes the
//! FIFO queue one job at a time, runs the command as a subprocess, and
//! relays its combined stdout/stderr line-by-line into the job's channel,
//! followed by a completion sentinel.
//!
//! Each job's output channel has exactly one producer (the worker) and at
//! most one consumer: `stream` takes the receiver out of the registry, so a
//! second subscriber to the same job sees an empty sequence. The channel is
//! dropped once the stream is drained, leaving nothing behind for abandoned
//! jobs that were streamed; jobs never streamed keep buffering until the
//! registry itself is dropped.

use std::process::Stdio;

use dashmap::DashMap;
use futures::stream::Stream;
use parking_lot::Mutex;
use priceloom_domain::{JobCommand, JobEvent, JobId, PriceloomError, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct QueuedJob {
    id: JobId,
    command: JobCommand,
    output: UnboundedSender<JobEvent>,
}

/// Owned job table + single serial worker.
pub struct JobRegistry {
    queue_tx: UnboundedSender<QueuedJob>,
    outputs: DashMap<JobId, UnboundedReceiver<JobEvent>>,
    cancellation: CancellationToken,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

impl JobRegistry {
    /// Create the registry and spawn its worker task. Must be called from
    /// within a tokio runtime.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        let worker = tokio::spawn(worker_loop(queue_rx, cancellation.clone()));

        Self {
            queue_tx,
            outputs: DashMap::new(),
            cancellation,
            worker_handle: Mutex::new(Some(worker)),
        }
    }

    /// Queue a command for execution and return its job id.
    pub fn enqueue(&self, command: JobCommand) -> Result<JobId> {
        let id = JobId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.outputs.insert(id, rx);

        self.queue_tx.send(QueuedJob { id, command, output: tx }).map_err(|_| {
            self.outputs.remove(&id);
            PriceloomError::Internal("job worker is not running".into())
        })?;

        debug!(job_id = %id, "job enqueued");
        Ok(id)
    }

    /// Take the job's output stream.
    ///
    /// The first caller gets the live line sequence, terminated by the
    /// sentinel; any later caller (or a caller with an unknown id) gets an
    /// immediately empty stream.
    pub fn stream(&self, job_id: JobId) -> impl Stream<Item = String> + Send + 'static {
        let receiver = self.outputs.remove(&job_id).map(|(_, rx)| rx);
        if receiver.is_none() {
            debug!(job_id = %job_id, "stream requested for unknown or drained job");
        }

        futures::stream::unfold(receiver, |mut receiver| async move {
            let rx = receiver.as_mut()?;
            match rx.recv().await {
                Some(JobEvent::Line(line)) => Some((line, receiver)),
                Some(JobEvent::Done) | None => None,
            }
        })
    }

    /// Stop the worker. Queued jobs that have not started are abandoned.
    pub async fn shutdown(&self) {
        self.cancellation.cancel();
        let handle = self.worker_handle.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "job worker terminated abnormally");
            }
        }
    }
}

impl Drop for JobRegistry {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

async fn worker_loop(mut queue_rx: UnboundedReceiver<QueuedJob>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("job worker cancelled");
                break;
            }
            job = queue_rx.recv() => {
                let Some(job) = job else { break };
                run_job(job).await;
            }
        }
    }
}

/// Run one job to completion, relaying output. Jobs are strictly serial:
/// this is awaited inline by the worker loop.
async fn run_job(job: QueuedJob) {
    let QueuedJob { id, command, output } = job;
    info!(job_id = %id, program = %command.program, "starting job");

    let spawned = tokio::process::Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            warn!(job_id = %id, error = %err, "failed to start job");
            let _ = output.send(JobEvent::Line(format!("failed to start job: {err}")));
            let _ = output.send(JobEvent::Done);
            return;
        }
    };

    let stdout_task = child.stdout.take().map(|s| tokio::spawn(forward_lines(s, output.clone())));
    let stderr_task = child.stderr.take().map(|s| tokio::spawn(forward_lines(s, output.clone())));

    let status = child.wait().await;
    for task in [stdout_task, stderr_task].into_iter().flatten() {
        let _ = task.await;
    }

    match status {
        Ok(status) => info!(job_id = %id, code = status.code(), "job finished"),
        Err(err) => warn!(job_id = %id, error = %err, "job wait failed"),
    }

    let _ = output.send(JobEvent::Done);
}

async fn forward_lines<R>(reader: R, output: UnboundedSender<JobEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if output.send(JobEvent::Line(line)).is_err() {
            break;
        }
    }
}
