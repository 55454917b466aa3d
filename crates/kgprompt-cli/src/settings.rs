//! Runtime settings, layered from an optional TOML file and `KGPROMPT_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kgprompt_core::persist::{DEFAULT_DEBOUNCE, DEFAULT_STORAGE_KEY};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  #[serde(default = "default_storage_key")]
  pub storage_key:       String,
  #[serde(default = "default_save_debounce_ms")]
  pub save_debounce_ms:  u64,
  #[serde(default = "default_export_path")]
  pub export_path:       PathBuf,
  #[serde(default = "default_clipboard_command")]
  pub clipboard_command: String,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/kgprompt/state.db") }

fn default_storage_key() -> String { DEFAULT_STORAGE_KEY.to_owned() }

fn default_save_debounce_ms() -> u64 { DEFAULT_DEBOUNCE.as_millis() as u64 }

fn default_export_path() -> PathBuf { PathBuf::from("kg-prompt-config.json") }

fn default_clipboard_command() -> String {
  if cfg!(target_os = "macos") { "pbcopy" } else { "wl-copy" }.to_owned()
}

impl Settings {
  /// Read `path` (if it exists), then the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("KGPROMPT"))
      .build()
      .context("failed to read config file")?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
