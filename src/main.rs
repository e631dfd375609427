//! DuckDex CLI entry point

use clap::Parser;
use console::style;
use duckdex::app::App;
use duckdex::cli::{commands, Cli, Commands};
use duckdex::config::{Config, ConfigManager};
use duckdex::error::DexResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DexResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    duckdex::ui::init_theme();
    debug!("Using config {}", config_manager.path().display());

    // Commands that never touch the data directory
    let command = match cli.command {
        Commands::Config(args) => return commands::config(args, &config_manager, &config).await,
        Commands::Completions(args) => return commands::completions(args),
        other => other,
    };

    let data_dir = ConfigManager::data_dir(&config, cli.data_dir.as_deref());
    let app = App::open(config, data_dir).await?;

    match command {
        Commands::Discover(args) => commands::discover(args, &app).await,
        Commands::Show(args) => commands::show(args, &app).await,
        Commands::Collection(args) => commands::collection(args, &app).await,
        Commands::Install(args) => commands::install(args, &app).await,
        Commands::Fetch(args) => commands::fetch(args, &app).await,
        Commands::Status => commands::status(&app).await,
        Commands::Reset(args) => commands::reset(args, &app).await,
        Commands::Config(_) | Commands::Completions(_) => unreachable!("handled above"),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; dev mode always logs debug
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        _ if config.general.dev_mode => "debug",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::new(format!("duckdex={}", level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
