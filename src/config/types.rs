//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/docbridge/) and project (.docbridge/) level
//! configuration. The merged `Config` value is constructed once at startup
//! and passed by reference to every component that needs it; nothing reads
//! ambient environment state at call sites.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Backend endpoints and transport settings
    pub backend: BackendConfig,

    /// Documentation export settings
    pub export: ExportSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            backend: BackendConfig::default(),
            export: ExportSettings::default(),
        }
    }
}

impl Config {
    /// Validate configuration values. Returns `BridgeError::Config` on
    /// failure; a missing required value is fatal here rather than at some
    /// later call site.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.backend.api_base_url.trim().is_empty() {
            return Err(crate::types::BridgeError::Config(
                "backend.api_base_url is not set. Configure it in .docbridge/config.toml \
                 or via DOCBRIDGE_BACKEND__API_BASE_URL"
                    .to_string(),
            ));
        }

        if url::Url::parse(&self.backend.api_base_url).is_err() {
            return Err(crate::types::BridgeError::Config(format!(
                "backend.api_base_url is not a valid URL: {}",
                self.backend.api_base_url
            )));
        }

        if self.backend.timeout_secs == 0 {
            return Err(crate::types::BridgeError::Config(
                "backend.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Backend Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL for REST calls (required)
    pub api_base_url: String,

    /// Base URL for the status stream; derived from `api_base_url`
    /// (http -> ws) when unset
    pub ws_base_url: Option<String>,

    /// Base URL under which rendered dependency-graph images are served;
    /// defaults to `api_base_url`
    pub graph_visual_base_url: Option<String>,

    /// Base URL for generated static artifacts (PDF/DOCX downloads);
    /// defaults to `api_base_url`
    pub static_base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            ws_base_url: None,
            graph_visual_base_url: None,
            static_base_url: None,
            timeout_secs: 60,
        }
    }
}

impl BackendConfig {
    /// Streaming endpoint base. Falls back to `api_base_url` with the
    /// scheme swapped (`http` -> `ws`, `https` -> `wss`).
    pub fn ws_base(&self) -> String {
        if let Some(ws) = &self.ws_base_url {
            return ws.trim_end_matches('/').to_string();
        }
        let api = self.api_base_url.trim_end_matches('/');
        if let Some(rest) = api.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = api.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            api.to_string()
        }
    }

    pub fn graph_visual_base(&self) -> &str {
        self.graph_visual_base_url
            .as_deref()
            .unwrap_or(&self.api_base_url)
    }

    pub fn static_base(&self) -> &str {
        self.static_base_url
            .as_deref()
            .unwrap_or(&self.api_base_url)
    }
}

// =============================================================================
// Export Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Default output path for the exported document
    pub output: PathBuf,

    /// Include the project overview section by default
    pub include_overview: bool,

    /// How component source is rendered in the export
    pub source_code_mode: SourceCodeMode,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("documentation.html"),
            include_overview: true,
            source_code_mode: SourceCodeMode::Signature,
        }
    }
}

/// How much of a component's source the export embeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceCodeMode {
    /// Signature line only
    #[default]
    Signature,
    /// Full source body
    Full,
    /// Signature block followed by the full source
    Both,
}

impl std::fmt::Display for SourceCodeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceCodeMode::Signature => write!(f, "signature"),
            SourceCodeMode::Full => write!(f, "full"),
            SourceCodeMode::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for SourceCodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "signature" => Ok(SourceCodeMode::Signature),
            "full" => Ok(SourceCodeMode::Full),
            "both" => Ok(SourceCodeMode::Both),
            _ => Err(format!(
                "Unknown source code mode: {}. Valid values: signature, full, both",
                s
            )),
        }
    }
}

/// Layout the backend uses for generated PDF/DOCX results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Structured document with tables for parameters, returns, etc.
    #[default]
    Table,
    /// Narrative, paragraph-based format
    NonTable,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Table => write!(f, "table"),
            GenerationMode::NonTable => write!(f, "non_table"),
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(GenerationMode::Table),
            "non_table" | "non-table" => Ok(GenerationMode::NonTable),
            _ => Err(format!(
                "Unknown generation mode: {}. Valid values: table, non_table",
                s
            )),
        }
    }
}
