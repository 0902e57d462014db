//! On-disk layout of an agent storage root.
//!
//! ```text
//! <root>/
//!   agent-config.yaml
//!   actions/<name>.yaml
//!   plugins/
//!   local/            (git-ignored)
//!     logs/
//!     plugins/
//!     cache/<version>/<language>.vocabulary
//! ```

use crate::definitions::{AgentConfig, ACTIONS_DIR, AGENT_CONFIG_PATH};
use crate::error::Result;
use std::path::{Path, PathBuf};

pub const PLUGINS_DIR: &str = "plugins";
pub const LOCAL_DIR: &str = "local";
pub const GITIGNORE_FILE: &str = ".gitignore";
pub const LOCAL_IGNORE_RULE: &str = "local/*";

#[must_use]
pub fn local_dir(root: &Path) -> PathBuf {
    root.join(LOCAL_DIR)
}

#[must_use]
pub fn logs_dir(root: &Path) -> PathBuf {
    local_dir(root).join("logs")
}

#[must_use]
pub fn default_cache_dir(root: &Path) -> PathBuf {
    local_dir(root).join("cache")
}

/// Create whatever part of the layout is missing. Returns the paths that were created or
/// updated. Existing files are never overwritten.
pub fn init_storage_layout(root: &Path) -> Result<Vec<PathBuf>> {
    let mut touched = Vec::new();

    let config_path = root.join(AGENT_CONFIG_PATH);
    if !config_path.exists() {
        log::info!("Agent configuration not found, writing defaults to {:?}", config_path);
        std::fs::write(&config_path, AgentConfig::default().to_yaml()?)?;
        touched.push(config_path);
    }

    for dir in [
        root.join(ACTIONS_DIR),
        root.join(PLUGINS_DIR),
        logs_dir(root),
        local_dir(root).join(PLUGINS_DIR),
        default_cache_dir(root),
    ] {
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
            log::info!("Created {:?}", dir);
            touched.push(dir);
        }
    }

    let gitignore = root.join(GITIGNORE_FILE);
    let current = match std::fs::read_to_string(&gitignore) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(err.into()),
    };
    let has_rule = current
        .as_deref()
        .is_some_and(|text| text.lines().any(|line| line.trim() == LOCAL_IGNORE_RULE));
    if !has_rule {
        let mut text = current.unwrap_or_default();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(LOCAL_IGNORE_RULE);
        text.push('\n');
        std::fs::write(&gitignore, text)?;
        log::info!("Added {LOCAL_IGNORE_RULE:?} to {:?}", gitignore);
        touched.push(gitignore);
    }

    Ok(touched)
}
