//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{DexError, DexResult};
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> DexResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }
    Ok(())
}

fn show_config(config: &Config) -> DexResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> DexResult<()> {
    let ctx = UiContext::detect();

    match manager.init(force).await {
        Ok(()) => {
            ui::step_ok_detail(
                &ctx,
                "Configuration initialized",
                &manager.path().display().to_string(),
            );
            Ok(())
        }
        Err(DexError::ConfigExists(path)) => {
            ui::step_warn_hint(
                &ctx,
                &format!("Config already exists at {}", path.display()),
                "Use --force to overwrite",
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}
