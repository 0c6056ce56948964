//! Console output helpers for the CLI commands.

use console::style;

/// Uniform formatting for user-facing command output.
///
/// Progress lines go to stdout so they can be piped or silenced; warnings
/// and errors go to stderr with a status prefix.
pub struct Output;

impl Output {
    /// Plain progress line.
    pub fn info(msg: &str) {
        println!("{}", msg);
    }

    /// Completion line.
    pub fn success(msg: &str) {
        println!("{}", style(msg).green());
    }

    pub fn warning(msg: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", style("error:").red().bold(), msg);
    }

    /// Underlined section header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Indented key-value line.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Indented list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }
}
