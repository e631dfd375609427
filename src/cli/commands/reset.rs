//! Reset command - start over

use crate::app::App;
use crate::cli::args::ResetArgs;
use crate::error::{DexError, DexResult};
use crate::ui::{self, TaskSpinner, UiContext};
use tracing::warn;

/// Execute the reset command
pub async fn execute(args: ResetArgs, app: &App) -> DexResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    let confirmed = ui::confirm(
        &ctx,
        "This will remove all collected ducks and cached data. Continue?",
        false,
    )
    .await?;
    if !confirmed {
        ui::step_info(&ctx, "Reset cancelled");
        return Ok(());
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Resetting DuckDex...");
    match app.reset().await {
        Ok(report) => {
            spinner.stop("Reset complete");
            ui::remark(
                &ctx,
                &format!("{} cache(s) deleted", report.caches_deleted),
            );
            ui::outro_success(&ctx, "All data cleared. DuckDex starts fresh.");
            Ok(())
        }
        Err(e) => {
            warn!("{}", e);
            spinner.stop_error("Reset failed");
            Err(DexError::User(
                "Something went wrong while resetting. Please try again.".to_string(),
            ))
        }
    }
}
