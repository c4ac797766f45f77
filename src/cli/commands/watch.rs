//! Follow a running analysis task over the status stream.
//!
//! Prints a progress line whenever the snapshot advances and surfaces
//! connection loss/reconnect transitions. The stream is supervised: an
//! unexpected close while the task is still running triggers bounded
//! exponential-backoff reconnects before the failure becomes persistent.

use crate::cli::ui::Output;
use crate::config::Config;
use crate::stream::supervisor::{ReconnectPolicy, SupervisedStream};
use crate::types::{Result, TaskStatus};

pub async fn run(config: &Config, task_id: &str) -> Result<()> {
    let out = Output::new();

    let stream =
        SupervisedStream::open(&config.backend.ws_base(), task_id, ReconnectPolicy::default())
            .await?;
    out.info(&format!("Watching task {task_id}"));

    let mut snapshots = stream.watch_snapshot();
    let mut connected = stream.watch_connected();
    let mut last_status = TaskStatus::Pending;
    let mut last_files = 0usize;
    let mut last_completed = 0u64;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();

                if snapshot.status != last_status {
                    out.progress(&format!("status: {}", snapshot.status));
                    last_status = snapshot.status;
                }
                if snapshot.discovered_files.len() != last_files {
                    last_files = snapshot.discovered_files.len();
                    out.progress(&format!("discovered {last_files} files"));
                }
                if snapshot.completed_components_count != last_completed {
                    last_completed = snapshot.completed_components_count;
                    out.progress(&format!(
                        "documented {last_completed}/{} components",
                        snapshot.components.len()
                    ));
                }
                if snapshot.status.is_terminal() {
                    break;
                }
            }
            changed = connected.changed() => {
                if changed.is_err() {
                    break;
                }
                if *connected.borrow() {
                    out.success("Reconnected to status stream");
                } else {
                    out.warning("Status stream connection lost");
                }
            }
        }
    }

    let snapshot = stream.close().await;

    out.section("Task summary");
    out.key_value("task", &snapshot.task_id);
    out.key_value("status", &snapshot.status.to_string());
    out.key_value("files", &snapshot.discovered_files.len().to_string());
    out.key_value("components", &snapshot.components.len().to_string());
    if let Some(folder) = &snapshot.extracted_folder_name {
        out.key_value("folder", folder);
    }

    match snapshot.status {
        TaskStatus::Failed => {
            let reason = snapshot.error.as_deref().unwrap_or("no error reported");
            out.error(&format!("Task failed: {reason}"));
        }
        TaskStatus::Completed => {
            out.success("Task completed");
        }
        _ => {
            out.warning("Stream ended before the task reached a terminal state");
        }
    }

    Ok(())
}
