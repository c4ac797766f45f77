//! Job Status Snapshot
//!
//! Locally held, incrementally updated picture of one backend analysis
//! task. The WebSocket stream delivers partial-state patches; a pure
//! reducer ([`JobStatusSnapshot::apply`]) merges each patch into the
//! snapshot, so the merge semantics are unit-testable with no network or
//! rendering dependency.
//!
//! ## Merge rule
//!
//! - Scalar fields present in a patch overwrite the snapshot's fields
//!   (last-write-wins, arrival order).
//! - `status` never regresses out of a terminal state.
//! - `discovered_files` is append-only.
//! - `completed_components_count` is monotonically non-decreasing.
//! - `components` is unioned key-by-key: a new id is appended in discovery
//!   order; a resent id has its stored fields overridden field-by-field,
//!   retaining fields the patch omits. Patches never remove components.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::component::CodeComponent;

/// Lifecycle state of a backend analysis task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Mutable, process-local view of one active task.
///
/// Owned exclusively by the subscription that created it; observers see
/// published clones, never partial merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusSnapshot {
    pub task_id: String,
    pub status: TaskStatus,
    /// File paths discovered during extraction, in discovery order
    pub discovered_files: Vec<String>,
    /// Discovered components in discovery order; ids are unique
    pub components: Vec<CodeComponent>,
    pub completed_components_count: u64,
    pub extracted_folder_name: Option<String>,
    /// Backend-reported failure message, if the task failed
    pub error: Option<String>,
}

impl JobStatusSnapshot {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            discovered_files: Vec::new(),
            components: Vec::new(),
            completed_components_count: 0,
            extracted_folder_name: None,
            error: None,
        }
    }

    /// Look up a top-level component by id
    pub fn component(&self, id: &str) -> Option<&CodeComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Merge one patch into this snapshot. Pure with respect to I/O; every
    /// malformed sub-entry is logged and skipped without touching the rest
    /// of the snapshot.
    pub fn apply(&mut self, patch: StatusPatch) {
        if let Some(next) = patch.status {
            if self.status.is_terminal() && !next.is_terminal() {
                warn!(
                    task_id = %self.task_id,
                    from = %self.status,
                    to = %next,
                    "dropping status regression out of terminal state"
                );
            } else {
                self.status = next;
            }
        }

        if let Some(count) = patch.completed_components_count {
            self.completed_components_count = self.completed_components_count.max(count);
        }

        if let Some(files) = patch.discovered_files {
            for file in files {
                if !self.discovered_files.contains(&file) {
                    self.discovered_files.push(file);
                }
            }
        }

        if let Some(entries) = patch.components {
            for (id, value) in entries {
                self.merge_component(&id, value);
            }
        }

        if patch.extracted_folder_name.is_some() {
            self.extracted_folder_name = patch.extracted_folder_name;
        }
        if patch.error.is_some() {
            self.error = patch.error;
        }
    }

    fn merge_component(&mut self, id: &str, value: Value) {
        let Value::Object(mut fields) = value else {
            warn!(component = id, "component patch entry is not an object, skipping");
            return;
        };
        // The mapping key is canonical; an embedded id field never overrides it.
        fields.insert("id".to_string(), Value::String(id.to_string()));

        if let Some(existing) = self.components.iter_mut().find(|c| c.id == id) {
            let mut merged = match serde_json::to_value(&*existing) {
                Ok(Value::Object(map)) => map,
                _ => return,
            };
            for (key, val) in fields {
                merged.insert(key, val);
            }
            match serde_json::from_value::<CodeComponent>(Value::Object(merged)) {
                Ok(updated) => *existing = updated,
                Err(e) => warn!(component = id, "skipping unparsable component update: {e}"),
            }
        } else {
            match serde_json::from_value::<CodeComponent>(Value::Object(fields)) {
                Ok(component) => self.components.push(component),
                Err(e) => warn!(component = id, "skipping unparsable component: {e}"),
            }
        }
    }
}

/// One incremental update received over the streaming channel.
///
/// Every field is optional: a patch carries only what changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPatch {
    pub status: Option<TaskStatus>,
    pub discovered_files: Option<Vec<String>>,
    /// Component id -> (partial) component object
    pub components: Option<serde_json::Map<String, Value>>,
    pub completed_components_count: Option<u64>,
    pub extracted_folder_name: Option<String>,
    pub error: Option<String>,
}

impl StatusPatch {
    /// Parse one raw text frame. A parse failure is the caller's signal to
    /// log and discard the frame; it must not close the stream or alter the
    /// snapshot.
    pub fn parse(raw: &str) -> crate::types::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn component_value(start_line: u32) -> Value {
        json!({
            "component_type": "function",
            "relative_path": "pkg/mod.py",
            "start_line": start_line,
            "end_line": start_line + 5
        })
    }

    fn patch_with_component(id: &str, start_line: u32) -> StatusPatch {
        let mut components = serde_json::Map::new();
        components.insert(id.to_string(), component_value(start_line));
        StatusPatch {
            components: Some(components),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_patch_scenario() {
        // Scenario lifted from the backend contract: a later patch that
        // omits `components` must not erase earlier entries.
        let mut snapshot = JobStatusSnapshot::new("abc123");

        let first = StatusPatch::parse(
            r#"{"status":"running","completed_components_count":2,
                "components":{"a.b":{"component_type":"function",
                "relative_path":"a.py","start_line":1,"end_line":4}}}"#,
        )
        .unwrap();
        snapshot.apply(first);

        let second =
            StatusPatch::parse(r#"{"status":"completed","completed_components_count":5}"#).unwrap();
        snapshot.apply(second);

        assert_eq!(snapshot.status, TaskStatus::Completed);
        assert_eq!(snapshot.completed_components_count, 5);
        assert!(snapshot.component("a.b").is_some());
    }

    #[test]
    fn test_malformed_frame_is_non_fatal() {
        let mut snapshot = JobStatusSnapshot::new("t1");
        snapshot.apply(patch_with_component("x.y", 3));
        let before = snapshot.clone();

        assert!(StatusPatch::parse("not json").is_err());

        // Nothing was applied, so nothing changed.
        assert_eq!(before.status, snapshot.status);
        assert_eq!(before.components.len(), snapshot.components.len());
        assert_eq!(
            before.completed_components_count,
            snapshot.completed_components_count
        );
    }

    #[test]
    fn test_component_field_level_merge() {
        let mut snapshot = JobStatusSnapshot::new("t1");
        let mut components = serde_json::Map::new();
        components.insert(
            "a.b".to_string(),
            json!({
                "component_type": "function",
                "relative_path": "a.py",
                "start_line": 1,
                "end_line": 9,
                "docstring": "original"
            }),
        );
        snapshot.apply(StatusPatch {
            components: Some(components),
            ..Default::default()
        });

        // Resend the id with only a new dependency_graph_url; the docstring
        // and line bounds must survive.
        let mut update = serde_json::Map::new();
        update.insert("a.b".to_string(), json!({"dependency_graph_url": "g/a_b.png"}));
        snapshot.apply(StatusPatch {
            components: Some(update),
            ..Default::default()
        });

        let c = snapshot.component("a.b").unwrap();
        assert_eq!(c.docstring.as_deref(), Some("original"));
        assert_eq!(c.end_line, 9);
        assert_eq!(c.dependency_graph_url.as_deref(), Some("g/a_b.png"));
    }

    #[test]
    fn test_terminal_status_never_regresses() {
        let mut snapshot = JobStatusSnapshot::new("t1");
        snapshot.apply(StatusPatch {
            status: Some(TaskStatus::Failed),
            ..Default::default()
        });
        snapshot.apply(StatusPatch {
            status: Some(TaskStatus::Running),
            ..Default::default()
        });
        assert_eq!(snapshot.status, TaskStatus::Failed);
    }

    #[test]
    fn test_completed_count_is_monotone() {
        let mut snapshot = JobStatusSnapshot::new("t1");
        snapshot.apply(StatusPatch {
            completed_components_count: Some(7),
            ..Default::default()
        });
        snapshot.apply(StatusPatch {
            completed_components_count: Some(3),
            ..Default::default()
        });
        assert_eq!(snapshot.completed_components_count, 7);
    }

    #[test]
    fn test_discovered_files_append_only() {
        let mut snapshot = JobStatusSnapshot::new("t1");
        snapshot.apply(StatusPatch {
            discovered_files: Some(vec!["a.py".into(), "b.py".into()]),
            ..Default::default()
        });
        snapshot.apply(StatusPatch {
            discovered_files: Some(vec!["b.py".into(), "c.py".into()]),
            ..Default::default()
        });
        assert_eq!(snapshot.discovered_files, vec!["a.py", "b.py", "c.py"]);
    }

    #[test]
    fn test_unparsable_component_is_skipped() {
        let mut snapshot = JobStatusSnapshot::new("t1");
        let mut components = serde_json::Map::new();
        components.insert("bad".to_string(), json!({"component_type": "function"}));
        components.insert("good".to_string(), component_value(1));
        snapshot.apply(StatusPatch {
            components: Some(components),
            ..Default::default()
        });
        assert!(snapshot.component("good").is_some());
        assert!(snapshot.component("bad").is_none());
    }

    proptest! {
        /// For any sequence of patches, the final components mapping equals
        /// the key-wise union of the patches, later values overriding
        /// earlier ones per key, insertion order = first appearance.
        #[test]
        fn prop_components_union(
            patches in prop::collection::vec(
                prop::collection::vec(("[a-e]", 1u32..100), 0..4),
                0..8,
            )
        ) {
            let mut snapshot = JobStatusSnapshot::new("prop");
            let mut expected: Vec<(String, u32)> = Vec::new();

            for patch_entries in &patches {
                let mut components = serde_json::Map::new();
                for (id, line) in patch_entries {
                    components.insert(id.clone(), component_value(*line));
                    match expected.iter_mut().find(|(eid, _)| eid == id) {
                        Some(entry) => entry.1 = *line,
                        None => expected.push((id.clone(), *line)),
                    }
                }
                snapshot.apply(StatusPatch {
                    components: Some(components),
                    ..Default::default()
                });
            }

            let actual: Vec<(String, u32)> = snapshot
                .components
                .iter()
                .map(|c| (c.id.clone(), c.start_line))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
