//! Status lines for duckdex commands
//!
//! Every line goes through one of two renderers. A terminal gets cliclack's
//! gutter; CI and pipes get a bracketed tag per line (`[OK]`, `[WARN]`,
//! `[FAIL]`, `[INFO]`) so logs stay greppable.

use super::context::UiContext;
use console::{style, Style, StyledObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Tone {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Tone::Ok => style("[OK]").green(),
            Tone::Warn => style("[WARN]").yellow(),
            Tone::Fail => style("[FAIL]").red(),
            Tone::Info => style("[INFO]").cyan(),
        }
    }

    fn emphasis(self) -> Style {
        match self {
            Tone::Ok => Style::new().green().bold(),
            Tone::Fail => Style::new().red().bold(),
            Tone::Warn | Tone::Info => Style::new().yellow().bold(),
        }
    }
}

/// Plain-mode rendering of one step line
fn tagged(tone: Tone, text: &str) -> String {
    format!("  {} {}", tone.tag(), text)
}

fn step(ctx: &UiContext, tone: Tone, text: String) {
    if !ctx.use_fancy_output() {
        println!("{}", tagged(tone, &text));
        return;
    }
    let _ = match tone {
        Tone::Ok => cliclack::log::success(text),
        Tone::Warn => cliclack::log::warning(text),
        Tone::Fail => cliclack::log::error(text),
        Tone::Info => cliclack::log::info(text),
    };
}

fn closing(ctx: &UiContext, tone: Tone, message: &str) {
    if ctx.use_fancy_output() {
        let _ = cliclack::outro(tone.emphasis().apply_to(message));
    } else {
        println!();
        println!("{} {}", tone.tag(), message);
    }
}

/// Command banner
pub fn intro(ctx: &UiContext, title: &str) {
    let title = style(title).yellow().bold();
    if ctx.use_fancy_output() {
        let _ = cliclack::intro(title);
    } else {
        println!("{}\n", title);
    }
}

pub fn outro_success(ctx: &UiContext, message: &str) {
    closing(ctx, Tone::Ok, message);
}

pub fn outro_warn(ctx: &UiContext, message: &str) {
    closing(ctx, Tone::Warn, message);
}

/// Bold heading for a group of key/value lines
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        let _ = cliclack::log::info(style(title).bold());
    } else {
        println!("{}", style(title).bold());
    }
}

/// Finished step with a dimmed detail, e.g. "Images cached (2 stored)"
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.use_fancy_output() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, Tone::Ok, format!("{} ({})", message, detail));
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Tone::Warn, message.to_string());
}

/// Warning followed by what the user can run next
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    let hint = if ctx.use_fancy_output() {
        style(hint).dim().to_string()
    } else {
        hint.to_string()
    };
    step(ctx, Tone::Warn, format!("{} - {}", message, hint));
}

pub fn step_error(ctx: &UiContext, message: &str) {
    step(ctx, Tone::Fail, message.to_string());
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Tone::Info, message.to_string());
}

/// Untagged dim line
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        let _ = cliclack::log::remark(message);
    } else {
        println!("  {}", style(message).dim());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim().to_string()
    } else {
        key.to_string()
    };
    println!("  {}: {}", key, value);
}

/// Status field: green when `ok`, yellow otherwise; `[OK]`/`[--]` in plain mode
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let tone = if ok { Tone::Ok } else { Tone::Warn };
        let value = tone.emphasis().apply_to(value);
        println!("  {}: {}", style(key).dim(), value);
    } else {
        let mark = if ok { "[OK]" } else { "[--]" };
        println!("  {} {}: {}", mark, key, value);
    }
}
