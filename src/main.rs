use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodscope::analysis::client::HttpAnalysisClient;
use moodscope::analysis::{AnalysisFetcher, AnalysisOutcome};
use moodscope::app::App;
use moodscope::config::{Config, LogConfig};
use moodscope::report::describe_outcome;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "moodscope")]
#[command(about = "Chart precomputed tweet sentiment for a Twitter handle", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/moodscope/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the analysis API base url
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one analysis and print it
    Analyse {
        handle: String,
        /// Print the classified response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the API health endpoint
    Health,
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

/// Logs go to a file while the dashboard owns the terminal, to stderr otherwise.
fn init_tracing(log: &LogConfig, to_file: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    if to_file {
        let path = log.file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    Ok(())
}

fn build_client(config: &Config) -> Result<HttpAnalysisClient> {
    HttpAnalysisClient::new(&config.api.base_url, config.api.timeout())
        .context("creating analysis client")
}

fn load_config(cli: &Cli, config_path: &Path) -> Result<Config> {
    let mut config = Config::load(config_path)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    init_tracing(&config.log, cli.command.is_none())?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match &cli.command {
        Some(Commands::Init { force }) => {
            Config::write_template(&config_path, *force)?;
            println!("Wrote {}", config_path.display());
        }
        Some(Commands::Analyse { handle, json }) => {
            let config = load_config(&cli, &config_path)?;
            let client = build_client(&config)?;
            let outcome = client.analyse(handle).await?;

            let ok = if *json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                matches!(outcome, AnalysisOutcome::Success(_))
            } else {
                let (text, ok) = describe_outcome(handle, &outcome);
                if ok {
                    print!("{}", text);
                } else {
                    eprintln!("{}", text);
                }
                ok
            };

            if !ok {
                std::process::exit(1);
            }
        }
        Some(Commands::Health) => {
            let config = load_config(&cli, &config_path)?;
            let client = build_client(&config)?;
            let body = client.health().await?;
            println!("{}", body.trim());
        }
        None => {
            let config = load_config(&cli, &config_path)?;
            run_dashboard(&config)?;
        }
    }

    Ok(())
}

fn run_dashboard(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let mut app = App::new(Arc::new(client), config.dashboard.response_order);
    if config.dashboard.check_health {
        app.spawn_health_check();
    }

    tracing::info!(base_url = %config.api.base_url, "starting dashboard");

    // try_init installs a panic hook that restores the terminal.
    let mut terminal = match ratatui::try_init() {
        Ok(terminal) => terminal,
        Err(e) => {
            ratatui::restore();
            return Err(e).context("initialising terminal");
        }
    };

    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}
