use std::path::{Path, PathBuf};

pub const VOCABULARY_EXTENSION: &str = "vocabulary";
pub const CHECKSUM_FILE: &str = "actions.checksum";

/// `<root>/<version>/<language>.vocabulary` and `<root>/<version>/actions.checksum`.
#[derive(Clone, Debug)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn generation_dir(&self, version: &str) -> PathBuf {
        self.root.join(safe_component(version))
    }

    pub fn vocabulary_path(&self, version: &str, language: &str) -> PathBuf {
        self.generation_dir(version).join(format!(
            "{}.{VOCABULARY_EXTENSION}",
            safe_component(language)
        ))
    }

    pub fn checksum_path(&self, version: &str) -> PathBuf {
        self.generation_dir(version).join(CHECKSUM_FILE)
    }
}

fn safe_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        out
    }
}
