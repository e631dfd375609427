//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{DexError, DexResult};

/// Ask a yes/no question
///
/// `--yes` answers yes; a non-interactive terminal gets `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> DexResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| DexError::Internal(format!("Prompt task failed: {}", e)))?
    .map_err(|e| DexError::User(format!("Prompt cancelled: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirm_auto_yes() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Reset?", false).await.unwrap());
    }

    #[tokio::test]
    async fn confirm_non_interactive_default() {
        let ctx = UiContext::non_interactive();
        assert!(confirm(&ctx, "Reset?", true).await.unwrap());
        assert!(!confirm(&ctx, "Reset?", false).await.unwrap());
    }
}
