use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docbridge::cli::commands;
use docbridge::client::ApiClient;
use docbridge::client::wire::ClearTarget;
use docbridge::config::{Config, ConfigLoader, GenerationMode, SourceCodeMode};

/// Parse a source code mode from string
fn parse_source_mode(s: &str) -> Result<SourceCodeMode, String> {
    s.parse()
}

/// Parse a generation mode from string
fn parse_generation_mode(s: &str) -> Result<GenerationMode, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "docbridge")]
#[command(
    version,
    about = "Command-line client for a code documentation generation platform"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload zipped source repositories
    Upload {
        #[arg(required = true, help = "Paths to .zip archives")]
        files: Vec<PathBuf>,
    },

    /// Manage uploaded archives
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },

    /// Start an analysis job for an uploaded archive
    Analyze {
        #[arg(help = "Id of the uploaded archive")]
        file_id: String,
        #[arg(long, help = "Name of the analysis configuration on the backend")]
        config: String,
        #[arg(long, help = "Name for this analysis run")]
        name: String,
        #[arg(long, help = "Subfolder of the archive to analyze")]
        root_folder: Option<String>,
        #[arg(long, help = "Follow the task's progress after starting it")]
        watch: bool,
    },

    /// Follow a running task's status stream
    Watch {
        task_id: String,
    },

    /// Manage analysis configurations on the backend
    Configs {
        #[command(subcommand)]
        action: ConfigsAction,
    },

    /// Browse documentation runs and generate results
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },

    /// Export a documentation run to a standalone HTML file
    Export {
        #[arg(help = "Documentation run id")]
        id: String,
        #[arg(long, short, help = "Output path (default from config)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Skip the project overview section")]
        no_overview: bool,
        #[arg(long, value_parser = parse_source_mode, help = "Source rendering: signature, full, both")]
        source_mode: Option<SourceCodeMode>,
    },

    /// Download raw component result sets
    Components {
        #[command(subcommand)]
        action: ComponentsAction,
    },

    /// Clear backend working data
    Clean {
        #[arg(value_enum, help = "What to clear")]
        target: CleanTarget,
    },

    /// Manage local configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FilesAction {
    /// List uploaded archives
    List,
    /// Delete an uploaded archive
    Delete { file_id: String },
}

#[derive(Subcommand)]
enum ConfigsAction {
    /// List configurations
    List,
    /// Upload a YAML configuration
    Upload {
        name: String,
        file: PathBuf,
    },
    /// Print a configuration's content
    Show { name: String },
    /// Delete a configuration
    Delete { name: String },
    /// Download a configuration file
    Download {
        name: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    /// List documentation runs
    List,
    /// Show a run's summary
    Show { id: String },
    /// Generate PDF/DOCX results for a run
    Generate {
        id: String,
        #[arg(long, value_parser = parse_generation_mode, default_value = "table", help = "Layout: table, non_table")]
        mode: GenerationMode,
        #[arg(long, help = "Include the project overview")]
        include_overview: Option<bool>,
        #[arg(long, value_parser = parse_source_mode, help = "Source rendering: signature, full, both")]
        source_mode: Option<SourceCodeMode>,
        #[arg(long, help = "Also download the artifact: pdf or docx")]
        download: Option<String>,
    },
}

#[derive(Subcommand)]
enum ComponentsAction {
    /// Download a component result set
    Download {
        file_name: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CleanTarget {
    RedisTasks,
    DependencyGraphs,
    PycgOutputs,
    ExtractedProjects,
    All,
}

impl From<CleanTarget> for ClearTarget {
    fn from(target: CleanTarget) -> Self {
        match target {
            CleanTarget::RedisTasks => ClearTarget::RedisTasks,
            CleanTarget::DependencyGraphs => ClearTarget::DependencyGraphs,
            CleanTarget::PycgOutputs => ClearTarget::PycgOutputs,
            CleanTarget::ExtractedProjects => ClearTarget::ExtractedProjects,
            CleanTarget::All => ClearTarget::All,
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Initialize project configuration
    Init {
        #[arg(long, help = "Backend API base URL to write into the scaffold")]
        api_base_url: Option<String>,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        // Local config management must work before a backend is configured.
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => commands::config::show(json)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { api_base_url } => commands::config::init(api_base_url)?,
        },
        command => {
            let config = ConfigLoader::load()?;
            let client = ApiClient::new(&config.backend)?;

            let rt = Runtime::new()?;
            rt.block_on(dispatch(command, &config, &client))?;
        }
    }

    Ok(())
}

async fn dispatch(command: Commands, config: &Config, client: &ApiClient) -> anyhow::Result<()> {
    match command {
        Commands::Upload { files } => {
            commands::upload::run(client, files).await?;
        }
        Commands::Files { action } => match action {
            FilesAction::List => commands::files::list(client).await?,
            FilesAction::Delete { file_id } => commands::files::delete(client, &file_id).await?,
        },
        Commands::Analyze {
            file_id,
            config: config_filename,
            name,
            root_folder,
            watch,
        } => {
            commands::analyze::run(
                config,
                client,
                commands::analyze::AnalyzeArgs {
                    file_id,
                    config_filename,
                    process_name: name,
                    root_folder,
                    watch,
                },
            )
            .await?;
        }
        Commands::Watch { task_id } => {
            commands::watch::run(config, &task_id).await?;
        }
        Commands::Configs { action } => match action {
            ConfigsAction::List => commands::configs::list(client).await?,
            ConfigsAction::Upload { name, file } => {
                commands::configs::upload(client, &name, &file).await?
            }
            ConfigsAction::Show { name } => commands::configs::show(client, &name).await?,
            ConfigsAction::Delete { name } => commands::configs::delete(client, &name).await?,
            ConfigsAction::Download { name, output } => {
                commands::configs::download(client, &name, output).await?
            }
        },
        Commands::Docs { action } => match action {
            DocsAction::List => commands::docs::list(client).await?,
            DocsAction::Show { id } => commands::docs::show(client, &id).await?,
            DocsAction::Generate {
                id,
                mode,
                include_overview,
                source_mode,
                download,
            } => {
                commands::docs::generate(
                    config,
                    client,
                    commands::docs::GenerateArgs {
                        id,
                        mode,
                        include_overview,
                        source_code_mode: source_mode,
                        download,
                    },
                )
                .await?;
            }
        },
        Commands::Export {
            id,
            output,
            no_overview,
            source_mode,
        } => {
            commands::export::run(
                config,
                client,
                commands::export::ExportArgs {
                    id,
                    output,
                    no_overview,
                    source_mode,
                },
            )
            .await?;
        }
        Commands::Components { action } => match action {
            ComponentsAction::Download { file_name, output } => {
                commands::components::download(client, &file_name, output).await?
            }
        },
        Commands::Clean { target } => {
            commands::clean::run(client, target.into()).await?;
        }
        Commands::Config { .. } => unreachable!("handled before backend setup"),
    }

    Ok(())
}
