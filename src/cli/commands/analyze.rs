//! Start a backend analysis job for an uploaded archive.

use crate::cli::commands::watch;
use crate::cli::ui::Output;
use crate::client::ApiClient;
use crate::client::wire::AnalyzeRequest;
use crate::config::Config;
use crate::types::Result;

pub struct AnalyzeArgs {
    pub file_id: String,
    pub config_filename: String,
    pub process_name: String,
    pub root_folder: Option<String>,
    /// Attach to the task's status stream after starting it
    pub watch: bool,
}

pub async fn run(config: &Config, client: &ApiClient, args: AnalyzeArgs) -> Result<()> {
    let out = Output::new();

    let response = client
        .start_analysis(
            &args.file_id,
            &AnalyzeRequest {
                config_filename: args.config_filename,
                process_name: args.process_name,
                root_folder: args.root_folder,
            },
        )
        .await?;

    out.success(&format!("Analysis started, task id: {}", response.task_id));

    if args.watch {
        watch::run(config, &response.task_id).await?;
    } else {
        out.info(&format!(
            "Follow progress with: docbridge watch {}",
            response.task_id
        ));
    }

    Ok(())
}
