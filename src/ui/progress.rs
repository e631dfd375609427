//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::orchestrator::{SeedObserver, SeedOutcome, SeedReport};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress bar for image seeding
///
/// An indicatif bar in interactive mode, one line per asset otherwise.
pub struct SeedProgress {
    bar: Option<ProgressBar>,
}

impl SeedProgress {
    pub fn new(ctx: &UiContext) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(0);
            let template = ProgressStyle::default_bar()
                .template("  {spinner:.yellow} Caching images  {bar:20.yellow/dim} {pos}/{len} {msg:.dim}")
                .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ").progress_chars("━╸─"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(template);
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }
}

impl SeedObserver for SeedProgress {
    fn started(&self, total: usize) {
        match &self.bar {
            Some(bar) => bar.set_length(total as u64),
            None => println!("Caching {} images...", total),
        }
    }

    fn asset_done(&self, id: &str, outcome: SeedOutcome) {
        match &self.bar {
            Some(bar) => {
                bar.set_message(id.to_string());
                bar.inc(1);
            }
            None => {
                let label = match outcome {
                    SeedOutcome::Stored => style("[OK]").green(),
                    SeedOutcome::Skipped => style("[SKIP]").dim(),
                    SeedOutcome::Failed => style("[FAIL]").red(),
                };
                println!("  {} {}", label, id);
            }
        }
    }

    fn finished(&self, _report: &SeedReport) {
        if let Some(bar) = &self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
