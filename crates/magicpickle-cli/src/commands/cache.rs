//! Cache command implementation.

use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use magicpickle_core::cache::CacheSlot;
use magicpickle_core::config::Config;

use super::{CacheAction, CacheArgs};
use crate::ui::{format_age, format_size};

/// Run the cache command.
pub fn run(args: &CacheArgs) -> Result<()> {
    let global_config = super::load_config();
    let slot = configured_slot(&global_config);

    match args.action {
        CacheAction::Show { json } => show(&slot, json),
        CacheAction::Clear => {
            if slot.clear().context("Failed to clear cache")? {
                println!("Removed cached payload at {}", slot.path().display());
            } else {
                println!("Cache is already empty ({})", slot.path().display());
            }
            Ok(())
        }
        CacheAction::Path => {
            println!("{}", slot.path().display());
            Ok(())
        }
    }
}

/// The slot from configuration, or the default slot when caching is disabled.
fn configured_slot(config: &Config) -> CacheSlot {
    config
        .session
        .cache_slot()
        .unwrap_or_else(CacheSlot::at_default_location)
}

fn show(slot: &CacheSlot, json: bool) -> Result<()> {
    let Some(info) = slot.info().context("Failed to inspect cache")? else {
        if json {
            println!(
                "{}",
                serde_json::json!({ "path": slot.path(), "cached": false })
            );
        } else {
            println!("No cached payload at {}", slot.path().display());
        }
        return Ok(());
    };

    let items = slot.read().context("Failed to decode cached payload")?;
    let modified = info.modified.map(DateTime::<Local>::from);

    if json {
        let output = serde_json::json!({
            "path": info.path,
            "cached": true,
            "size": info.size,
            "modified": modified.map(|t| t.to_rfc3339()),
            "items": items,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Cached payload: {}", info.path.display());
    println!("  Size:     {}", format_size(info.size));
    if let Some(modified) = info.modified {
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        let modified = DateTime::<Local>::from(modified);
        let stamp = modified.format("%Y-%m-%d %H:%M:%S");
        println!("  Modified: {} ({})", stamp, format_age(age));
    }
    println!("  Objects:  {}", items.len());
    for (index, item) in items.iter().enumerate() {
        println!("  [{index}] {}", preview(item));
    }

    Ok(())
}

fn preview(item: &serde_json::Value) -> String {
    const MAX_CHARS: usize = 60;
    let text = item.to_string();
    if text.chars().count() <= MAX_CHARS {
        return text;
    }
    let truncated: String = text.chars().take(MAX_CHARS).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_truncates_long_values() {
        assert_eq!(preview(&json!("short")), "\"short\"");
        let long = json!("x".repeat(100));
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 63);
    }

    #[test]
    fn test_disabled_cache_still_has_a_slot() {
        let mut config = Config::default();
        config.session.use_cache = false;
        assert_eq!(configured_slot(&config).path(), CacheSlot::default_path());
    }
}
