//! Terminal styling helpers.
//!
//! Thin wrappers over `console::style` so the rest of the crate never
//! touches styling APIs directly. Each step kind gets its own color,
//! mirroring how the interactive transcript reads.

use console::style;

/// Banner gold (256-color 214), bold.
pub fn gold(text: &str) -> String {
    style(text).color256(214).bold().to_string()
}

/// Dimmed secondary text.
pub fn dim(text: &str) -> String {
    style(text).dim().to_string()
}

/// START steps.
pub fn magenta(text: &str) -> String {
    style(text).magenta().to_string()
}

/// PLAN steps.
pub fn cyan(text: &str) -> String {
    style(text).cyan().to_string()
}

/// TOOL invocations and their results.
pub fn blue(text: &str) -> String {
    style(text).blue().to_string()
}

/// Final OUTPUT answers.
pub fn green(text: &str) -> String {
    style(text).green().to_string()
}

/// Warnings and confirmation prompts.
pub fn yellow(text: &str) -> String {
    style(text).yellow().to_string()
}

/// Section headings (status output).
pub fn header(text: &str) -> String {
    style(text).white().bold().to_string()
}

/// Field labels (status output).
pub fn accent(text: &str) -> String {
    style(text).cyan().bold().to_string()
}

/// Field values (status output).
pub fn value(text: &str) -> String {
    style(text).green().to_string()
}
