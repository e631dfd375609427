//! Item card rendering
//!
//! One [`Card`] value backs both outputs: HTML markup and a styled
//! terminal block via `Display`.

use crate::ledger::Item;
use chrono::{Local, TimeZone};
use console::style;
use std::fmt;

/// Banner shown above a first discovery
pub const NEW_BANNER: &str = "🎉 NEW DUCK!";

/// Options controlling what a card shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardOptions {
    pub show_stats: bool,
    /// Preformatted first-found text
    pub first_found: String,
    pub scans: u32,
    pub is_new: bool,
}

/// A rendered card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    item: Item,
    options: CardOptions,
}

/// Build the card for `item`
pub fn render_card(item: &Item, options: &CardOptions) -> Card {
    Card {
        item: item.clone(),
        options: options.clone(),
    }
}

/// First-found label: "Just now" for new items, else local date-time
pub fn first_found_text(is_new: bool, first_found_ms: i64) -> String {
    if is_new {
        return "Just now".to_string();
    }
    match Local.timestamp_millis_opt(first_found_ms).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Unknown".to_string(),
    }
}

impl Card {
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Card markup with all item text escaped
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"duck-card\">\n");
        if self.options.is_new {
            html.push_str(&format!("  <div class=\"new-duck-banner\">{}</div>\n", NEW_BANNER));
        }
        html.push_str(&format!("  <h3>{}</h3>\n", escape_html(&self.item.name)));
        html.push_str(&format!("  <p>{}</p>\n", escape_html(&self.item.fact)));
        if let Some(image) = self.item.image.as_deref().filter(|i| !i.is_empty()) {
            html.push_str(&format!(
                "  <img src=\"{}\" alt=\"{}\" />\n",
                escape_html(image),
                escape_html(&self.item.name)
            ));
        }
        if self.options.show_stats {
            html.push_str("  <div class=\"duck-stats\">\n");
            html.push_str(&format!(
                "    <p><strong>First found:</strong> {}</p>\n",
                escape_html(&self.options.first_found)
            ));
            html.push_str(&format!(
                "    <p><strong>Times scanned:</strong> {}</p>\n",
                self.options.scans
            ));
            html.push_str("  </div>\n");
        }
        html.push_str("</div>");
        html
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.is_new {
            writeln!(f, "{}", style(NEW_BANNER).yellow().bold())?;
        }
        writeln!(f, "{}", style(&self.item.name).bold())?;
        write!(f, "{}", self.item.fact)?;
        if let Some(image) = self.item.image.as_deref().filter(|i| !i.is_empty()) {
            write!(f, "\n{} {}", style("Image:").dim(), image)?;
        }
        if self.options.show_stats {
            write!(
                f,
                "\n{} {}\n{} {}",
                style("First found:").dim(),
                self.options.first_found,
                style("Times scanned:").dim(),
                self.options.scans
            )?;
        }
        Ok(())
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
