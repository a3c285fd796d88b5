//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use magicpickle_core::config::Config;

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub fn run(args: &ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = super::load_config();
            let rendered = toml::to_string_pretty(&config)
                .context("Failed to render configuration")?;
            println!("# {}", Config::config_path().display());
            println!(
                "# role on this machine: {}",
                config.role_resolver().resolve()
            );
            println!();
            print!("{rendered}");
        }
        ConfigAction::Path => println!("{}", Config::config_path().display()),
        ConfigAction::Init { force } => {
            let path = Config::config_path();
            if init_at(&path, force)? {
                println!("Wrote default configuration to {}", path.display());
            } else {
                println!(
                    "Configuration already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
        }
    }
    Ok(())
}

/// Write the default configuration to `path`; returns `false` when an
/// existing file was left alone.
fn init_at(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    Config::default()
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(init_at(&path, false).unwrap());

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            toml::to_string(&loaded).unwrap(),
            toml::to_string(&Config::default()).unwrap()
        );
    }

    #[test]
    fn test_init_keeps_existing_file_unless_forced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(!init_at(&path, false).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        assert!(init_at(&path, true).unwrap());
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
    }
}
