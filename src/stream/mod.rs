//! Job Status Stream
//!
//! Maintains a live view of one backend analysis task. A subscription
//! opens the WebSocket endpoint for a task id, parses each incoming text
//! frame as a partial-state patch, merges it into the running
//! [`JobStatusSnapshot`] in arrival order, and publishes the result over a
//! `watch` channel. Malformed frames are logged and discarded; they never
//! close the connection or touch the snapshot.
//!
//! A plain subscription never reconnects; see [`supervisor`] for the
//! supervised variant with bounded exponential backoff.

pub mod supervisor;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use crate::types::{BridgeError, JobStatusSnapshot, Result, StatusPatch};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a reader loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReadEnd {
    /// The server closed the connection (task finished or backend shutdown)
    ServerClosed,
    /// `close()` was invoked or the subscription was dropped
    CallerClosed,
    /// Transport-level failure
    Failed(String),
}

/// Connect to the subscribe endpoint for `task_id`
pub(crate) async fn connect(ws_base: &str, task_id: &str) -> Result<WsStream> {
    if task_id.trim().is_empty() {
        return Err(BridgeError::invalid_input("task id must not be empty"));
    }
    let url = format!(
        "{}/analyze/ws/subscribe/{}",
        ws_base.trim_end_matches('/'),
        task_id
    );
    debug!(%url, "opening status stream");
    let (ws, _) = connect_async(&url)
        .await
        .map_err(|e| BridgeError::stream(format!("connect to {url} failed: {e}")))?;
    Ok(ws)
}

/// Drain one connection: apply text frames in arrival order, answer pings,
/// stop on close/error/shutdown. Seeds its working snapshot from the
/// current published value so a reconnect continues where the previous
/// connection left off.
pub(crate) async fn read_loop(
    ws: WsStream,
    snap_tx: &watch::Sender<JobStatusSnapshot>,
    conn_tx: &watch::Sender<bool>,
    mut shutdown: watch::Receiver<bool>,
) -> ReadEnd {
    let (mut sink, mut stream) = ws.split();
    let mut snapshot = snap_tx.borrow().clone();

    let end = loop {
        tokio::select! {
            stop = async { shutdown.wait_for(|stop| *stop).await.map(|_| ()) } => {
                // A dropped shutdown sender means the subscription is gone.
                let _ = stop;
                break ReadEnd::CallerClosed;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match StatusPatch::parse(&text) {
                        Ok(patch) => {
                            snapshot.apply(patch);
                            let _ = snap_tx.send(snapshot.clone());
                        }
                        Err(e) => {
                            warn!(task_id = %snapshot.task_id, "discarding malformed status frame: {e}");
                        }
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = sink.send(Message::Pong(payload)).await;
                }
                Some(Ok(Message::Close(_))) | None => break ReadEnd::ServerClosed,
                Some(Ok(_)) => {}
                Some(Err(e)) => break ReadEnd::Failed(e.to_string()),
            }
        }
    };

    let _ = conn_tx.send(false);
    if end == ReadEnd::CallerClosed {
        let _ = sink.send(Message::Close(None)).await;
    }
    end
}

/// Entry point for single-shot subscriptions
pub struct JobStatusStream;

impl JobStatusStream {
    /// Open a subscription for `task_id`. Exactly one connection per call;
    /// the returned handle owns it, and closing (or dropping) the handle
    /// terminates the connection so a superseded snapshot can never receive
    /// stale updates.
    pub async fn open(ws_base: &str, task_id: &str) -> Result<StatusSubscription> {
        let ws = connect(ws_base, task_id).await?;

        let (snap_tx, snap_rx) = watch::channel(JobStatusSnapshot::new(task_id));
        let (conn_tx, conn_rx) = watch::channel(true);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle =
            tokio::spawn(
                async move { read_loop(ws, &snap_tx, &conn_tx, shutdown_rx).await },
            );

        Ok(StatusSubscription {
            snapshot: snap_rx,
            connected: conn_rx,
            shutdown: shutdown_tx,
            handle,
        })
    }
}

/// Handle to one open status subscription
#[derive(Debug)]
pub struct StatusSubscription {
    snapshot: watch::Receiver<JobStatusSnapshot>,
    connected: watch::Receiver<bool>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<ReadEnd>,
}

impl StatusSubscription {
    /// Current snapshot (clone of the latest published state)
    pub fn snapshot(&self) -> JobStatusSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch channel carrying every snapshot update
    pub fn watch_snapshot(&self) -> watch::Receiver<JobStatusSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Watch channel carrying the connected signal. Transitions to `false`
    /// on close or error; there is no automatic reconnect here.
    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Deterministically terminate the connection and return the final
    /// snapshot.
    pub async fn close(self) -> JobStatusSnapshot {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
        self.snapshot.borrow().clone()
    }

    /// Wait until the server ends the stream (the task finished) or the
    /// connection fails, returning the final snapshot.
    pub async fn join(self) -> Result<JobStatusSnapshot> {
        let end = self
            .handle
            .await
            .map_err(|e| BridgeError::stream(format!("stream task panicked: {e}")))?;
        let snapshot = self.snapshot.borrow().clone();
        match end {
            ReadEnd::Failed(msg) => Err(BridgeError::stream(msg)),
            _ => Ok(snapshot),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;
    use tokio::net::TcpListener;

    /// Serve one WebSocket connection that sends `frames` and then closes.
    async fn one_shot_server(frames: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            for frame in frames {
                ws.send(Message::Text(frame.into())).await.unwrap();
            }
            let _ = ws.close(None).await;
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn test_rejects_empty_task_id() {
        let err = JobStatusStream::open("ws://127.0.0.1:1", " ").await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_patches_merge_in_arrival_order() {
        let ws_base = one_shot_server(vec![
            r#"{"status":"running","completed_components_count":2,
                "components":{"a.b":{"component_type":"function",
                "relative_path":"a.py","start_line":1,"end_line":4}}}"#
                .to_string(),
            r#"{"status":"completed","completed_components_count":5}"#.to_string(),
        ])
        .await;

        let sub = JobStatusStream::open(&ws_base, "abc123").await.unwrap();
        let snapshot = sub.join().await.unwrap();

        assert_eq!(snapshot.task_id, "abc123");
        assert_eq!(snapshot.status, TaskStatus::Completed);
        assert_eq!(snapshot.completed_components_count, 5);
        assert!(snapshot.component("a.b").is_some());
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_close_stream() {
        let ws_base = one_shot_server(vec![
            r#"{"status":"running"}"#.to_string(),
            "not json".to_string(),
            r#"{"status":"completed"}"#.to_string(),
        ])
        .await;

        let sub = JobStatusStream::open(&ws_base, "t1").await.unwrap();
        let snapshot = sub.join().await.unwrap();
        // The frame after the malformed one was still applied.
        assert_eq!(snapshot.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_connected_signal_drops_on_server_close() {
        let ws_base = one_shot_server(vec![r#"{"status":"completed"}"#.to_string()]).await;

        let sub = JobStatusStream::open(&ws_base, "t1").await.unwrap();
        let mut connected = sub.watch_connected();
        connected.wait_for(|up| !up).await.unwrap();
        assert!(!sub.is_connected());
    }

    #[tokio::test]
    async fn test_close_terminates_connection() {
        // Server keeps the connection open until the client closes.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(r#"{"status":"running"}"#.into()))
                .await
                .unwrap();
            // Wait for the client's close frame.
            while let Some(Ok(msg)) = ws.next().await {
                if matches!(msg, Message::Close(_)) {
                    break;
                }
            }
        });

        let sub = JobStatusStream::open(&format!("ws://{addr}"), "t1")
            .await
            .unwrap();
        let mut snapshots = sub.watch_snapshot();
        snapshots
            .wait_for(|s| s.status == TaskStatus::Running)
            .await
            .unwrap();

        let snapshot = sub.close().await;
        assert_eq!(snapshot.status, TaskStatus::Running);
        server.await.unwrap();
    }
}
