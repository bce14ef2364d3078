//! Colored terminal output helpers.
//!
//! User-facing diagnostics go through these so the coloring stays uniform;
//! `colored` drops the escapes itself when stderr is not a TTY.

use colored::Colorize;

/// Green checkmark + message (success)
pub fn success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg)
}

/// Yellow warning + message
pub fn warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg)
}

/// Red error + message
pub fn error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg)
}

/// Dim info/hint message
pub fn hint(msg: &str) -> String {
    format!("{}", msg.dimmed())
}

/// A progress step: cyan verb, plain detail ("Cloning repo...")
pub fn step(verb: &str, rest: &str) -> String {
    format!("{} {}", verb.cyan(), rest)
}

/// One dimmed entry of an advisory tree listing
pub fn tree_entry(name: &str) -> String {
    format!("    {}", name.dimmed())
}

/// Aligned key-value line for the publish summary
pub fn summary_line(key: &str, value: &str) -> String {
    format!("  {:<20} {}", format!("{}:", key).dimmed(), value)
}

/// Short commit hash, colored
pub fn commit_hash(hash: &str) -> String {
    format!("{}", hash.yellow())
}

/// Bold section label ("Copy errors:")
pub fn section(label: &str) -> String {
    format!("{}", label.bold())
}
