//! Export a documentation run to one standalone HTML file.

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::config::{Config, SourceCodeMode};
use crate::export::{ExportOptions, HtmlExporter};
use crate::model;
use crate::types::Result;

pub struct ExportArgs {
    pub id: String,
    pub output: Option<PathBuf>,
    pub no_overview: bool,
    pub source_mode: Option<SourceCodeMode>,
}

pub async fn run(config: &Config, client: &ApiClient, args: ExportArgs) -> Result<()> {
    let out = Output::new();

    let record = client.get_documentation(&args.id).await?;

    let mut options = ExportOptions::from_config(config);
    if args.no_overview {
        options.include_overview = false;
    }
    if let Some(mode) = args.source_mode {
        options.source_mode = mode;
    }

    let component_count = model::flatten(&record.components).count();
    out.info(&format!("Rendering {component_count} components"));

    let mut exporter = HtmlExporter::new(client, options);
    let artifact = exporter.export(&record).await?;

    let path = args.output.unwrap_or_else(|| config.export.output.clone());
    tokio::fs::write(&path, artifact.bytes()).await?;

    if artifact.report.failed > 0 {
        out.warning(&format!(
            "{} image{} could not be embedded and {} annotated in the document",
            artifact.report.failed,
            if artifact.report.failed == 1 { "" } else { "s" },
            if artifact.report.failed == 1 { "is" } else { "are" },
        ));
    }
    out.success(&format!(
        "Exported documentation to {} ({} images embedded)",
        path.display(),
        artifact.report.embedded
    ));

    Ok(())
}
