//! Manage uploaded archives on the backend.

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::types::Result;

pub async fn list(client: &ApiClient) -> Result<()> {
    let out = Output::new();
    let response = client.list_files().await?;

    if response.files.is_empty() {
        out.info("No uploaded files.");
        return Ok(());
    }

    out.header("Uploaded files");
    for file in &response.files {
        out.key_value(&file.id, &format!("{} ({})", file.name, human_size(file.size)));
    }
    Ok(())
}

pub async fn delete(client: &ApiClient, file_id: &str) -> Result<()> {
    let out = Output::new();
    client.delete_file(file_id).await?;
    out.success(&format!("Deleted file {file_id}"));
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
