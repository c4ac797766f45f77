//! Stream Supervisor
//!
//! Wraps the job status stream so the view of a running task survives
//! transient network loss: on an unexpected close while the task is still
//! in flight, the supervisor re-opens the subscription with bounded
//! exponential backoff, seeding the new connection from the snapshot
//! already accumulated. After the retry budget is exhausted the failure is
//! surfaced as a persistent error rather than a silent stall. A stream
//! that ends after the task reached a terminal status is a clean finish
//! and is never retried.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{ReadEnd, connect, read_loop};
use crate::types::{BridgeError, JobStatusSnapshot, Result};

/// Reconnect behavior for [`SupervisedStream`]
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Maximum reconnect attempts after an unexpected close
    pub max_retries: usize,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: 6,
        }
    }
}

impl ReconnectPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
    }
}

/// Supervised subscription: same surface as
/// [`StatusSubscription`](super::StatusSubscription), plus reconnects.
pub struct SupervisedStream {
    snapshot: watch::Receiver<JobStatusSnapshot>,
    connected: watch::Receiver<bool>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<Result<()>>,
}

impl SupervisedStream {
    /// Open a supervised subscription. The initial connection happens
    /// inline so address and configuration mistakes fail fast; only
    /// subsequent unexpected closes are retried.
    pub async fn open(ws_base: &str, task_id: &str, policy: ReconnectPolicy) -> Result<Self> {
        let ws = connect(ws_base, task_id).await?;

        let (snap_tx, snap_rx) = watch::channel(JobStatusSnapshot::new(task_id));
        let (conn_tx, conn_rx) = watch::channel(true);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let ws_base = ws_base.to_string();
        let task_id = task_id.to_string();
        let handle = tokio::spawn(async move {
            supervise(ws, &ws_base, &task_id, policy, snap_tx, conn_tx, shutdown_rx).await
        });

        Ok(Self {
            snapshot: snap_rx,
            connected: conn_rx,
            shutdown: shutdown_tx,
            handle,
        })
    }

    pub fn snapshot(&self) -> JobStatusSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<JobStatusSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Terminate the stream (and any pending reconnect) deterministically.
    pub async fn close(self) -> JobStatusSnapshot {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
        self.snapshot.borrow().clone()
    }

    /// Wait until the task finishes or the retry budget is exhausted.
    pub async fn join(self) -> Result<JobStatusSnapshot> {
        let result = self
            .handle
            .await
            .map_err(|e| BridgeError::stream(format!("stream task panicked: {e}")))?;
        result.map(|_| self.snapshot.borrow().clone())
    }
}

async fn supervise(
    first: super::WsStream,
    ws_base: &str,
    task_id: &str,
    policy: ReconnectPolicy,
    snap_tx: watch::Sender<JobStatusSnapshot>,
    conn_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    match read_loop(first, &snap_tx, &conn_tx, shutdown_rx.clone()).await {
        ReadEnd::CallerClosed => return Ok(()),
        ReadEnd::ServerClosed | ReadEnd::Failed(_) => {}
    }
    if snap_tx.borrow().status.is_terminal() {
        return Ok(());
    }

    let reconnect = || {
        let shutdown = shutdown_rx.clone();
        let snap_tx = &snap_tx;
        let conn_tx = &conn_tx;
        async move {
            if *shutdown.borrow() {
                return Ok(());
            }
            let ws = connect(ws_base, task_id).await?;
            let _ = conn_tx.send(true);
            info!(task_id, "status stream reconnected");
            match read_loop(ws, snap_tx, conn_tx, shutdown).await {
                ReadEnd::CallerClosed => Ok(()),
                end => {
                    if snap_tx.borrow().status.is_terminal() {
                        Ok(())
                    } else {
                        let detail = match end {
                            ReadEnd::Failed(msg) => msg,
                            _ => "connection closed before task completion".to_string(),
                        };
                        Err(BridgeError::stream(detail))
                    }
                }
            }
        }
    };

    let retrying = reconnect
        .retry(policy.backoff())
        .when(|e: &BridgeError| e.is_transient())
        .notify(|err, delay| {
            warn!(
                task_id,
                retry_in_secs = delay.as_secs_f32(),
                "status stream lost: {err}"
            );
        });

    // The retry chain must not outlive an explicit close: a caller waiting
    // in close() would otherwise block for up to a full backoff window.
    let mut shutdown = shutdown_rx.clone();
    tokio::select! {
        result = retrying => result,
        _ = shutdown.wait_for(|stop| *stop) => Ok(()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;
    use futures_util::SinkExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    fn fast_policy() -> ReconnectPolicy {
        ReconnectPolicy {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            max_retries: 3,
        }
    }

    #[tokio::test]
    async fn test_resumes_after_unexpected_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // First connection delivers one patch and drops without a close
        // handshake; the second finishes the task.
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(
                r#"{"status":"running","completed_components_count":1}"#.into(),
            ))
            .await
            .unwrap();
            drop(ws);

            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(
                r#"{"status":"completed","completed_components_count":4}"#.into(),
            ))
            .await
            .unwrap();
            let _ = ws.close(None).await;
        });

        let stream = SupervisedStream::open(&format!("ws://{addr}"), "t1", fast_policy())
            .await
            .unwrap();
        let snapshot = stream.join().await.unwrap();

        // State accumulated on the first connection survived the reconnect.
        assert_eq!(snapshot.status, TaskStatus::Completed);
        assert_eq!(snapshot.completed_components_count, 4);
    }

    #[tokio::test]
    async fn test_no_reconnect_after_terminal_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accepted = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            loop {
                let (tcp, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
                ws.send(Message::Text(r#"{"status":"completed"}"#.into()))
                    .await
                    .unwrap();
                let _ = ws.close(None).await;
            }
        });

        let stream = SupervisedStream::open(&format!("ws://{addr}"), "t1", fast_policy())
            .await
            .unwrap();
        let snapshot = stream.join().await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Completed);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_error() {
        // Server accepts exactly one connection and then disappears.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(r#"{"status":"running"}"#.into()))
                .await
                .unwrap();
            drop(ws);
            drop(listener);
        });

        let stream = SupervisedStream::open(&format!("ws://{addr}"), "t1", fast_policy())
            .await
            .unwrap();
        let err = stream.join().await.unwrap_err();
        assert!(matches!(err, BridgeError::Stream(_) | BridgeError::NoResponse(_)));
    }
}
