//! Browse documentation runs and trigger backend result generation.

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::client::wire::GenerateResultRequest;
use crate::config::{Config, GenerationMode, SourceCodeMode};
use crate::model::ComponentStats;
use crate::types::Result;

pub async fn list(client: &ApiClient) -> Result<()> {
    let out = Output::new();
    let docs = client.list_documentations().await?;

    if docs.is_empty() {
        out.info("No documentation runs found.");
        return Ok(());
    }

    out.header("Documentation runs");
    for doc in &docs {
        out.key_value(&doc.id, doc.name.as_deref().unwrap_or("(unnamed)"));
    }
    Ok(())
}

pub async fn show(client: &ApiClient, id: &str) -> Result<()> {
    let out = Output::new();
    let record = client.get_documentation(id).await?;
    let stats = ComponentStats::collect(&record.components);

    out.header(record.name.as_deref().unwrap_or(id));
    if let Some(duration) = record
        .meta_information
        .as_ref()
        .and_then(|m| m.execution_time.as_ref())
        .and_then(|t| t.formatted.as_deref())
    {
        out.key_value("duration", duration);
    }
    out.key_value("files", &stats.total_files.to_string());
    out.key_value("components", &stats.total_components.to_string());
    out.key_value("classes", &stats.classes.to_string());
    out.key_value("callables", &stats.callables.to_string());
    Ok(())
}

pub struct GenerateArgs {
    pub id: String,
    pub mode: GenerationMode,
    pub include_overview: Option<bool>,
    pub source_code_mode: Option<SourceCodeMode>,
    /// Download the generated artifact: "pdf" or "docx"
    pub download: Option<String>,
}

pub async fn generate(config: &Config, client: &ApiClient, args: GenerateArgs) -> Result<()> {
    let out = Output::new();

    let result = client
        .generate_result(
            &args.id,
            &GenerateResultRequest {
                mode: args.mode,
                include_overview: args.include_overview,
                source_code_mode: args.source_code_mode,
            },
        )
        .await?;

    out.success("Generation finished");
    if let Some(pdf) = &result.pdf_url {
        out.key_value("pdf", pdf);
    }
    if let Some(docx) = &result.docx_url {
        out.key_value("docx", docx);
    }

    if let Some(format) = args.download {
        let relative = match format.as_str() {
            "pdf" => result.pdf_url.as_deref(),
            "docx" => result.docx_url.as_deref(),
            other => {
                return Err(crate::types::BridgeError::invalid_input(format!(
                    "unknown download format '{other}'; expected pdf or docx"
                )));
            }
        };
        let Some(relative) = relative else {
            return Err(crate::types::BridgeError::NotFound(format!(
                "the backend did not produce a {format} artifact"
            )));
        };

        let url = format!(
            "{}/generated_doc/{}",
            config.backend.static_base().trim_end_matches('/'),
            relative
        );
        let (_, bytes) = client.fetch_bytes(&url).await?;
        let file_name = format!("{}_documentation.{format}", args.id);
        tokio::fs::write(&file_name, &bytes).await?;
        out.success(&format!("Saved {file_name}"));
    }

    Ok(())
}
