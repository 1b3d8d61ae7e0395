//! Settings file loading

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use brakelog_config::Settings;

/// Read flat settings from a TOML file
pub fn load(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}
