//! Upload zipped source repositories to the backend.

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::types::Result;

pub async fn run(client: &ApiClient, files: Vec<PathBuf>) -> Result<()> {
    let out = Output::new();

    let response = client.upload_files(&files).await?;

    out.success(&format!(
        "Uploaded {} file{}",
        response.uploaded_files.len(),
        if response.uploaded_files.len() == 1 { "" } else { "s" }
    ));
    for name in &response.uploaded_files {
        out.item(name);
    }

    Ok(())
}
