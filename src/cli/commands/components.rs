//! Download a task's raw component result set.

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::types::Result;

pub async fn download(client: &ApiClient, file_name: &str, output: Option<PathBuf>) -> Result<()> {
    let out = Output::new();

    let bytes = client.download_components(file_name).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(file_name));
    tokio::fs::write(&path, &bytes).await?;

    out.success(&format!("Saved component data to {}", path.display()));
    Ok(())
}
