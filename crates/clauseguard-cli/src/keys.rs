//! Local API key storage.
//!
//! The key lives in a plain file under the user's config directory and is
//! only ever sent as the Authorization header of generation calls. The env
//! var takes precedence when both are set (see `clauseguard_ai::Credentials`).

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;

use clauseguard_ai::{KEY_ENV_VAR, KEY_PLACEHOLDER};

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store an API key locally.
    Set { key: String },
    /// Show whether a key is configured (masked).
    Show,
}

/// `$HOME/.config/clauseguard/api_key`, if HOME is known.
pub fn default_key_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/clauseguard/api_key"))
}

pub fn run(action: KeyAction) -> anyhow::Result<()> {
    let path = default_key_file().context("HOME is not set; cannot locate key file")?;

    match action {
        KeyAction::Set { key } => {
            let key = key.trim();
            anyhow::ensure!(
                !key.is_empty() && key != KEY_PLACEHOLDER,
                "refusing to store an empty or placeholder key"
            );
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&path, key).with_context(|| format!("writing {}", path.display()))?;
            println!("API key stored in {}", path.display());
        }
        KeyAction::Show => {
            if let Ok(key) = std::env::var(KEY_ENV_VAR)
                && !key.trim().is_empty()
                && key.trim() != KEY_PLACEHOLDER
            {
                println!("{KEY_ENV_VAR} is set: {}", mask(key.trim()));
                return Ok(());
            }
            match std::fs::read_to_string(&path) {
                Ok(key) if !key.trim().is_empty() => {
                    println!("key file {}: {}", path.display(), mask(key.trim()));
                }
                _ => println!("no API key configured"),
            }
        }
    }
    Ok(())
}

fn mask(key: &str) -> String {
    if key.chars().count() >= 8 {
        let head: String = key.chars().take(3).collect();
        let tail: String = key.chars().skip(key.chars().count() - 4).collect();
        format!("{head}****************{tail}")
    } else {
        "****".to_string()
    }
}
