//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use cloudbox_core::Metadata;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one listing line: kind, size, modification time and path.
pub fn entry(metadata: &Metadata) {
    let kind = if metadata.is_dir { "d" } else { "-" };
    let modified = metadata
        .modified_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "{} {:>10} {:>16} {}",
        kind,
        metadata.bytes,
        modified.dimmed(),
        metadata.path
    );
}
