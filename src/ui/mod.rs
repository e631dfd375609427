//! Terminal UI
//!
//! `cliclack` framing and prompts in an interactive terminal, tagged plain
//! lines in CI or when stdout is piped.
//!
//! ```rust,ignore
//! use duckdex::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//! ui::intro(&ctx, "DuckDex offline mode");
//! if ui::confirm(&ctx, "Cache images?", false).await? {
//!     ui::step_ok_detail(&ctx, "Images cached", "2 stored");
//! }
//! ui::outro_success(&ctx, "Ready");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, section, step_error,
    step_info, step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{SeedProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, DexTheme};
