//! Status command - consent, shell, and storage health

use crate::app::App;
use crate::consent::Consent;
use crate::error::DexResult;
use crate::shell::ShellState;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(app: &App) -> DexResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "DuckDex Status");

    ui::section(&ctx, "Consent");
    let install = app.consent().install().await?;
    let images = app.consent().images().await?;
    ui::key_value_status(&ctx, "Offline install", &install.to_string(), install == Consent::Yes);
    ui::key_value_status(&ctx, "Image caching", &images.to_string(), images == Consent::Yes);

    ui::section(&ctx, "Offline shell");
    let registration = app.shell().registration().await.unwrap_or_default();
    ui::key_value_status(
        &ctx,
        "State",
        &registration.state.to_string(),
        registration.state == ShellState::Active,
    );
    if let Some(generation) = registration.active_generation() {
        ui::key_value(&ctx, "Generation", generation);
    }
    if let Some(at) = registration.activated_at {
        ui::key_value(&ctx, "Activated", &at.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    let caches = app.shell().storage().keys().await?;
    ui::key_value(
        &ctx,
        "Caches",
        &if caches.is_empty() {
            "none".to_string()
        } else {
            caches.join(", ")
        },
    );
    ui::key_value(&ctx, "Origin", &app.config().shell.origin);

    ui::section(&ctx, "Storage");
    ui::key_value(&ctx, "Data directory", &app.data_dir().display().to_string());
    ui::key_value(&ctx, "Settings backend", app.store().backend_name());
    ui::key_value_status(
        &ctx,
        "Image store",
        if app.blobs().is_some() { "available" } else { "unavailable" },
        app.blobs().is_some(),
    );
    ui::key_value(&ctx, "Ducks collected", &app.ledger().len().await?.to_string());
    ui::key_value(&ctx, "Catalog entries", &app.catalog().len().to_string());

    ui::outro_success(&ctx, "Done");
    Ok(())
}
