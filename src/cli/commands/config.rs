//! Manage local docbridge configuration.

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(as_json: bool) -> Result<()> {
    ConfigLoader::show_config(as_json)
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize a project configuration scaffold
pub fn init(api_base_url: Option<String>) -> Result<()> {
    let out = Output::new();
    let path = ConfigLoader::init_project(api_base_url.as_deref())?;
    out.success(&format!("Project configuration at {}", path.display()));
    Ok(())
}
