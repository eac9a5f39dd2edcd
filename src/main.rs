use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use sqlpulse::{cli, logging, settings};

#[derive(Debug, Parser)]
#[command(name = "sqlpulse")]
#[command(about = "Dashboard client for the SQL Server observability API")]
struct App {
    /// Override the API base URL for this invocation
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the dashboard in the browser
    Web {
        /// Listen address (default from settings: 127.0.0.1:9750)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Query telemetry metrics: wait-stats, blocking, logs
    Metrics {
        endpoint: String,
        /// Restrict to one SQL Server instance
        #[arg(long)]
        instance: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Search expression (logs endpoint)
        #[arg(long)]
        search: Option<String>,
    },
    /// Query live DMV snapshots: waits, blocking, sessions
    Live {
        endpoint: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Request LLM insights for a set of metrics
    Analyze {
        #[arg(long)]
        title: Option<String>,
        /// Metrics as JSON text
        #[arg(long, conflicts_with = "metrics_file")]
        metrics: Option<String>,
        /// Read metrics JSON from a file
        #[arg(long)]
        metrics_file: Option<PathBuf>,
        /// Known issues to mention in the analysis
        #[arg(long)]
        issues: Option<String>,
    },
    /// Show or update the backend configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage local client settings (~/.sqlpulse/config.toml)
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the backend configuration
    Show {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Update fields, e.g. `elastic.url=http://es:9200 sqlserver.encrypt=true`
    Set {
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Show the effective settings and their sources
    Show,
    /// Write the default settings file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a single key, e.g. `api.base_url http://obs:8000`
    Set { key: String, value: String },
    /// Overwrite the settings file with defaults
    Reset,
    /// Print the settings file path
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut settings = settings::load();
    if let Some(url) = app.api_url {
        settings.api.base_url = url;
    }
    logging::init(&settings.logging.level);

    match app.command {
        Commands::Web { addr, no_open } => cli::run_web(&settings, addr.as_deref(), no_open),
        Commands::Metrics {
            endpoint,
            instance,
            limit,
            search,
        } => cli::run_metrics(
            &settings,
            &endpoint,
            instance.as_deref(),
            limit,
            search.as_deref(),
        ),
        Commands::Live { endpoint, limit } => cli::run_live(&settings, &endpoint, limit),
        Commands::Analyze {
            title,
            metrics,
            metrics_file,
            issues,
        } => cli::run_analyze(
            &settings,
            title.as_deref(),
            metrics.as_deref(),
            metrics_file.as_deref(),
            issues.as_deref(),
        ),
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let fmt = cli::OutputFormat::from_str_opt(Some(&format));
                cli::run_config_show(&settings, fmt)
            }
            ConfigAction::Set { assignments } => cli::run_config_set(&settings, &assignments),
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => cli::run_settings_show(),
            SettingsAction::Init { force } => cli::run_settings_init(force),
            SettingsAction::Set { key, value } => cli::run_settings_set(&key, &value),
            SettingsAction::Reset => cli::run_settings_reset(),
            SettingsAction::Path => cli::run_settings_path(),
        },
    }
}
