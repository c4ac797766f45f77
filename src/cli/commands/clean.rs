//! Clear backend-side working data through the data manager.

use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::client::wire::ClearTarget;
use crate::types::Result;

pub async fn run(client: &ApiClient, target: ClearTarget) -> Result<()> {
    let out = Output::new();
    client.clear_data(target).await?;
    out.success(&format!("Cleared {target}"));
    Ok(())
}
