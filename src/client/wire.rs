//! Wire Types
//!
//! Request and response payloads for the backend REST surface. Shapes
//! follow the backend contract; unknown fields are ignored on the way in
//! and optional fields are skipped on the way out.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::config::{GenerationMode, SourceCodeMode};
use crate::types::CodeComponent;

/// Response of `POST /api/files/upload`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub uploaded_files: Vec<String>,
}

/// Response of `GET /files/`
#[derive(Debug, Clone, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<StoredFile>,
}

/// One uploaded archive as listed by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Body of `POST /analyze/{file_id}`
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub config_filename: String,
    pub process_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,
}

/// Response of `POST /analyze/{file_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub task_id: String,
    /// Additional backend-specific fields we pass through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One entry of `GET /configs`
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `GET /configs/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigContent {
    pub content: String,
}

/// One entry of `GET /documentations`
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentationSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Full payload of `GET /documentations/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentationRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub components: Vec<CodeComponent>,
    #[serde(default)]
    pub meta_information: Option<MetaInformation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaInformation {
    #[serde(default)]
    pub execution_time: Option<ExecutionTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionTime {
    #[serde(default)]
    pub formatted: Option<String>,
}

/// Body of `POST /documentations/{id}/generate-result`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResultRequest {
    pub mode: GenerationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_overview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code_mode: Option<SourceCodeMode>,
}

/// Response of `POST /documentations/{id}/generate-result`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResultResponse {
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub docx_url: Option<String>,
}

/// Targets of the data-manager cleanup endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    RedisTasks,
    DependencyGraphs,
    PycgOutputs,
    ExtractedProjects,
    All,
}

impl ClearTarget {
    /// URL segment after `clear-`
    pub fn as_segment(&self) -> &'static str {
        match self {
            Self::RedisTasks => "redis-tasks",
            Self::DependencyGraphs => "dependency-graphs",
            Self::PycgOutputs => "pycg-outputs",
            Self::ExtractedProjects => "extracted-projects",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for ClearTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_segment())
    }
}
