//! Install command - one-time offline consent

use crate::app::App;
use crate::cli::args::InstallArgs;
use crate::consent::Consent;
use crate::error::{DexError, DexResult};
use crate::orchestrator::{Activation, ConsentPrompt, SeedReport, ShellOutcome};
use crate::ui::{self, SeedProgress, UiContext};
use async_trait::async_trait;

/// Answers from flags, falling back to interactive prompts
struct CliPrompt {
    ctx: UiContext,
    install: Option<bool>,
    images: Option<bool>,
}

#[async_trait]
impl ConsentPrompt for CliPrompt {
    async fn offer_install(&self) -> DexResult<bool> {
        match self.install {
            Some(answer) => Ok(answer),
            None => ui::confirm(&self.ctx, "Make DuckDex available offline?", true).await,
        }
    }

    async fn offer_image_cache(&self) -> DexResult<bool> {
        match self.images {
            Some(answer) => Ok(answer),
            None => {
                ui::confirm(
                    &self.ctx,
                    "Would you like to cache duck images for offline use?",
                    false,
                )
                .await
            }
        }
    }
}

/// Execute the install command
pub async fn execute(args: InstallArgs, app: &App) -> DexResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let install = match (args.yes, args.decline) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    if install.is_none() && !ctx.is_interactive() {
        let current = app.consent().install().await?;
        if !current.is_set() {
            return Err(DexError::User(
                "Offline install needs an answer; pass --yes or --decline".to_string(),
            ));
        }
    }

    ui::intro(&ctx, "DuckDex offline mode");

    let prompt = CliPrompt {
        ctx: ctx.clone(),
        install,
        images: args.images.map(|a| a.as_bool()),
    };
    let progress = SeedProgress::new(&ctx);

    let activation = app.orchestrator().maybe_activate(&prompt, &progress).await?;

    match activation {
        Activation::AlreadyDecided(Consent::Yes) => {
            let state = app.shell().state().await;
            ui::step_info(&ctx, &format!("Offline mode already enabled (shell {})", state));
            ui::outro_success(&ctx, "Nothing to do");
        }
        Activation::AlreadyDecided(_) => {
            ui::step_info(&ctx, "Offline mode was declined earlier");
            ui::remark(&ctx, "Run `duckdex reset` to be asked again");
            ui::outro_warn(&ctx, "Nothing to do");
        }
        Activation::Declined => {
            ui::outro_warn(&ctx, "Offline mode declined");
        }
        Activation::Activated { images, shell } => report(&ctx, images, shell),
        Activation::Resumed { images, shell } => {
            ui::step_info(&ctx, "Offline mode already enabled; retrying the shell install");
            report(&ctx, images, shell);
        }
    }

    Ok(())
}

fn report(ctx: &UiContext, images: Option<SeedReport>, shell: ShellOutcome) {
    match images {
        Some(report) => ui::step_ok_detail(
            ctx,
            "Images cached",
            &format!(
                "{} stored, {} already cached, {} failed",
                report.stored, report.skipped, report.failed
            ),
        ),
        None => ui::step_info(ctx, "Image caching skipped"),
    }

    match shell {
        ShellOutcome::Installed(report) => {
            ui::step_ok_detail(
                ctx,
                &format!("Shell {} installed", report.generation),
                &format!("{} resources", report.resources),
            );
            if !report.reaped.is_empty() {
                ui::remark(ctx, &format!("Removed old caches: {}", report.reaped.join(", ")));
            }
            ui::outro_success(ctx, "DuckDex is ready offline");
        }
        ShellOutcome::Failed(reason) => {
            ui::step_error(ctx, "Offline shell not installed");
            ui::step_warn_hint(ctx, &reason, "Check shell.origin, then run: duckdex install");
            ui::outro_warn(ctx, "Offline mode enabled without the shell");
        }
    }
}
