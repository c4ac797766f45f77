//! Manage analysis configurations stored on the backend (YAML files the
//! pipeline runs with).

use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::types::{BridgeError, Result};

pub async fn list(client: &ApiClient) -> Result<()> {
    let out = Output::new();
    let configs = client.list_configs().await?;

    if configs.is_empty() {
        out.info("No configurations uploaded.");
        return Ok(());
    }

    out.header("Analysis configurations");
    for entry in &configs {
        match &entry.created_at {
            Some(created) => out.key_value(&entry.name, created),
            None => out.item(&entry.name),
        }
    }
    Ok(())
}

pub async fn upload(client: &ApiClient, name: &str, file: &Path) -> Result<()> {
    let out = Output::new();

    // Catch syntax errors before the file leaves the machine.
    let raw = tokio::fs::read(file).await?;
    serde_yaml::from_slice::<serde_yaml::Value>(&raw).map_err(|e| {
        BridgeError::invalid_input(format!("{} is not valid YAML: {e}", file.display()))
    })?;

    client.upload_config(name, file).await?;
    out.success(&format!("Uploaded configuration '{name}'"));
    Ok(())
}

pub async fn show(client: &ApiClient, name: &str) -> Result<()> {
    let out = Output::new();
    let config = client.get_config(name).await?;
    out.header(name);
    println!("{}", config.content);
    Ok(())
}

pub async fn delete(client: &ApiClient, name: &str) -> Result<()> {
    let out = Output::new();
    client.delete_config(name).await?;
    out.success(&format!("Deleted configuration '{name}'"));
    Ok(())
}

pub async fn download(client: &ApiClient, name: &str, output: Option<PathBuf>) -> Result<()> {
    let out = Output::new();
    let bytes = client.download_config(name).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(name));
    tokio::fs::write(&path, &bytes).await?;
    out.success(&format!("Saved configuration to {}", path.display()));
    Ok(())
}
