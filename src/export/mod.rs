//! Documentation Export Pipeline
//!
//! Produces one self-contained, browsable-offline HTML document from a
//! component tree plus an optional project overview. A run is one-shot:
//!
//! `Idle -> Rendering -> EmbeddingImages -> Serializing -> Delivered`
//!
//! or `Idle -> Rendering -> Aborted` when there is no component content.
//! Individual image failures degrade in place (annotated alt text) and
//! never abort the run.

pub mod images;
pub mod render;

use tracing::{info, warn};

use crate::client::ApiClient;
use crate::client::wire::DocumentationRecord;
use crate::config::{Config, SourceCodeMode};
use crate::model::{self, ComponentStats, path_tree};
use crate::types::{BridgeError, Result};

pub use images::EmbedReport;

/// Default artifact name; deterministic across runs
pub const DEFAULT_EXPORT_FILE_NAME: &str = "documentation.html";

/// Pipeline phase of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Rendering,
    EmbeddingImages,
    Serializing,
    Delivered,
    Aborted,
}

/// Caller-supplied export parameters
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub include_overview: bool,
    pub source_mode: SourceCodeMode,
    /// Base URL dependency-graph image references are resolved against
    pub graph_visual_base_url: String,
    pub file_name: String,
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            include_overview: config.export.include_overview,
            source_mode: config.export.source_code_mode,
            graph_visual_base_url: config.backend.graph_visual_base().to_string(),
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

/// The finished artifact: a single in-memory HTML document. Written to
/// disk by the caller; nothing is persisted here.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub html: String,
    pub report: EmbedReport,
}

impl ExportArtifact {
    pub fn bytes(&self) -> &[u8] {
        self.html.as_bytes()
    }
}

/// One-shot exporter over a documentation record
pub struct HtmlExporter<'a> {
    client: &'a ApiClient,
    options: ExportOptions,
    state: ExportState,
}

impl<'a> HtmlExporter<'a> {
    pub fn new(client: &'a ApiClient, options: ExportOptions) -> Self {
        Self {
            client,
            options,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Run the pipeline. Aborts (no artifact) only when the record carries
    /// zero components; every other failure mode degrades gracefully.
    pub async fn export(&mut self, record: &DocumentationRecord) -> Result<ExportArtifact> {
        if self.state != ExportState::Idle {
            return Err(BridgeError::invalid_input(
                "export already ran; create a new exporter for another run",
            ));
        }

        self.state = ExportState::Rendering;
        if record.components.is_empty() {
            self.state = ExportState::Aborted;
            return Err(BridgeError::EmptyExport);
        }
        if let Err(e) = model::check_integrity(&record.components) {
            self.state = ExportState::Aborted;
            return Err(e);
        }

        let content = self.render_content(record);
        let nav = render::nav_html(&record.components, self.options.include_overview);

        self.state = ExportState::EmbeddingImages;
        let (content, report) = images::inline_images(self.client, &content).await;
        if report.failed > 0 {
            warn!(
                failed = report.failed,
                embedded = report.embedded,
                "some images could not be embedded; they are annotated in the export"
            );
        }

        self.state = ExportState::Serializing;
        let title = record.name.as_deref().unwrap_or("Documentation Export");
        let html = render::document(title, &nav, &content);

        self.state = ExportState::Delivered;
        info!(
            components = model::flatten(&record.components).count(),
            embedded_images = report.embedded,
            "documentation export assembled"
        );
        Ok(ExportArtifact {
            file_name: self.options.file_name.clone(),
            html,
            report,
        })
    }

    fn render_content(&self, record: &DocumentationRecord) -> String {
        let mut content = String::new();

        if self.options.include_overview {
            let stats = ComponentStats::collect(&record.components);
            let tree = path_tree::build(&record.components);
            content.push_str(&render::content_block(
                render::OVERVIEW_ID,
                &render::render_overview(record, &stats, &tree),
            ));
        }

        for component in model::flatten(&record.components) {
            content.push_str(&render::content_block(
                &component.id,
                &render::render_component(
                    component,
                    self.options.source_mode,
                    &self.options.graph_visual_base_url,
                ),
            ));
        }

        content
    }
}

// =============================================================================
// Tests
// =============================================================================
