//! Show command - one duck from the collection

use crate::app::App;
use crate::cli::args::ShowArgs;
use crate::error::{DexError, DexResult};

/// Execute the show command
pub async fn execute(args: ShowArgs, app: &App) -> DexResult<()> {
    let card = app
        .show(&args.key)
        .await?
        .ok_or_else(|| DexError::User(format!("No duck '{}' in the collection", args.key)))?;

    if args.html {
        println!("{}", card.to_html());
    } else {
        println!("{}", card);
    }
    Ok(())
}
