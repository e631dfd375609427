//! Discover command - scan a duck into the collection

use crate::app::{App, ImageStatus};
use crate::catalog::ScanParams;
use crate::cli::args::DiscoverArgs;
use crate::error::DexResult;
use crate::ui::{self, UiContext};

/// Shown when a scan resolves to nothing
pub const NOT_FOUND: &str = "Duck not found.";

/// Execute the discover command
pub async fn execute(args: DiscoverArgs, app: &App) -> DexResult<()> {
    let ctx = UiContext::detect().with_machine_output(args.html);
    let params = ScanParams {
        id: args.id,
        name: args.name,
        fact: args.fact,
        image: args.image,
    };

    let Some(outcome) = app.discover(&params).await else {
        println!("{}", NOT_FOUND);
        return Ok(());
    };

    if args.html {
        println!("{}", outcome.card.to_html());
        return Ok(());
    }

    println!("{}", outcome.card);
    match outcome.image {
        ImageStatus::Cached { bytes, .. } => {
            ui::remark(&ctx, &format!("Image served offline ({} bytes)", bytes))
        }
        ImageStatus::Placeholder(placeholder) => ui::remark(
            &ctx,
            &format!("Image not cached, showing {}", placeholder),
        ),
        ImageStatus::Remote(_) | ImageStatus::None => {}
    }
    if outcome.key.is_none() {
        ui::step_warn(&ctx, "Duck has no id or name; not added to the collection");
    }

    Ok(())
}
