//! Build-or-load of the (vocabulary, index) artifact for the active catalog generation.

use crate::checksum::{actions_checksum, read_checksum, write_checksum};
use crate::error::{AgentError, Result};
use crate::paths::{CacheLayout, VOCABULARY_EXTENSION};
use cobot_catalog::definitions::{action_name_from_path, ACTIONS_DIR, ACTION_FILE_EXTENSION};
use cobot_catalog::{ActionCatalog, ActionSet};
use cobot_vector_store::Artifact;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why the artifact for a generation was (re)built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildReason {
    /// No artifact existed for the generation.
    Missing,
    /// Local changes were seen for the first time.
    ChecksumAbsent,
    ChecksumChanged,
    /// The working tree is clean again but the artifact was built from local changes.
    ChangesReverted,
    /// The stored artifact could not be decoded.
    Corrupt(String),
    /// The stored artifact does not describe the loaded action set.
    EntryMismatch,
    Forced,
}

impl fmt::Display for BuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no cached artifact"),
            Self::ChecksumAbsent => f.write_str("first observation of local changes"),
            Self::ChecksumChanged => f.write_str("local changes modified"),
            Self::ChangesReverted => f.write_str("local changes reverted"),
            Self::Corrupt(msg) => write!(f, "corrupt artifact ({msg})"),
            Self::EntryMismatch => f.write_str("artifact does not match action set"),
            Self::Forced => f.write_str("rebuild requested"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    Loaded,
    Built(BuildReason),
}

impl CacheOutcome {
    #[must_use]
    pub const fn was_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }
}

/// Result of [`CacheManager::prepare`].
#[derive(Debug)]
pub struct PreparedArtifact {
    pub artifact: Artifact,
    pub version: String,
    pub path: PathBuf,
    pub outcome: CacheOutcome,
}

/// Keeps the persisted artifact for `(catalog version, language)` in sync with the catalog.
///
/// One generation directory per catalog version holds one artifact per language and the
/// checksum of uncommitted action changes. Rebuilds are wholesale.
#[derive(Debug, Clone)]
pub struct CacheManager {
    layout: CacheLayout,
    language: String,
}

impl CacheManager {
    pub fn new(root: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            layout: CacheLayout::new(root),
            language: language.into(),
        }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn artifact_path(&self, version: &str) -> PathBuf {
        self.layout.vocabulary_path(version, &self.language)
    }

    /// Ensure a valid artifact exists for the current generation and return it.
    pub fn prepare(
        &self,
        catalog: &dyn ActionCatalog,
        actions: &ActionSet,
    ) -> Result<PreparedArtifact> {
        self.prepare_inner(catalog, actions, false)
    }

    /// Discard the current generation's artifact and build it again.
    pub fn force_rebuild(
        &self,
        catalog: &dyn ActionCatalog,
        actions: &ActionSet,
    ) -> Result<PreparedArtifact> {
        self.prepare_inner(catalog, actions, true)
    }

    fn prepare_inner(
        &self,
        catalog: &dyn ActionCatalog,
        actions: &ActionSet,
        force: bool,
    ) -> Result<PreparedArtifact> {
        let version = catalog.current_version_id()?;
        let generation = self.layout.generation_dir(&version);
        std::fs::create_dir_all(&generation).map_err(|e| {
            AgentError::storage(format!("failed to create cache directory {generation:?}: {e}"))
        })?;
        let path = self.artifact_path(&version);

        let mut reason = self.check_local_changes(catalog, actions, &version, &path)?;
        if force {
            remove_artifact(&path)?;
            reason = Some(BuildReason::Forced);
        }

        if reason.is_none() {
            match Artifact::load(&path, &self.language) {
                Ok(artifact) if fits(&artifact, actions) => {
                    log::info!(
                        "Loaded action index {:?} ({} terms, {} entries)",
                        path,
                        artifact.vocabulary.len(),
                        artifact.index.len()
                    );
                    return Ok(PreparedArtifact {
                        artifact,
                        version,
                        path,
                        outcome: CacheOutcome::Loaded,
                    });
                }
                Ok(_) => {
                    log::warn!(
                        "Cached artifact {:?} does not match the action set, rebuilding",
                        path
                    );
                    reason = Some(BuildReason::EntryMismatch);
                }
                Err(err) if err.is_corrupt() => {
                    log::warn!("Cached artifact {:?} is corrupt, rebuilding: {err}", path);
                    reason = Some(BuildReason::Corrupt(err.to_string()));
                }
                Err(err) => match AgentError::from(err) {
                    AgentError::NotFound(_) => reason = Some(BuildReason::Missing),
                    other => return Err(other),
                },
            }
        }

        let reason = reason.unwrap_or(BuildReason::Missing);
        log::info!(
            "Building action index for version {version} ({}): {reason}",
            self.language
        );
        let artifact = Artifact::build(&actions.descriptions(), &self.language)?;
        artifact.save(&path)?;
        log::info!(
            "Saved action index {:?} ({} terms, {} entries)",
            path,
            artifact.vocabulary.len(),
            artifact.index.len()
        );
        Ok(PreparedArtifact {
            artifact,
            version,
            path,
            outcome: CacheOutcome::Built(reason),
        })
    }

    /// Compare uncommitted action changes with the stored checksum. Any invalidation deletes the
    /// artifact and rewrites (or removes) the checksum record in the same pass.
    fn check_local_changes(
        &self,
        catalog: &dyn ActionCatalog,
        actions: &ActionSet,
        version: &str,
        artifact_path: &Path,
    ) -> Result<Option<BuildReason>> {
        let checksum_path = self.layout.checksum_path(version);
        let stored = read_checksum(&checksum_path)?;

        if !catalog.has_uncommitted_changes()? {
            if stored.is_some() {
                remove_generation_artifacts(artifact_path)?;
                remove_file_if_exists(&checksum_path)?;
                return Ok(Some(BuildReason::ChangesReverted));
            }
            return Ok(None);
        }

        let changed = changed_actions(catalog, actions)?;
        let loaded: Vec<&str> = actions.names().collect();
        let current = actions_checksum(catalog, &loaded, &changed);
        log::debug!(
            "Uncommitted action changes {:?} (checksum {current}, stored {stored:?})",
            changed
        );
        let reason = match stored {
            None => BuildReason::ChecksumAbsent,
            Some(previous) if previous != current => BuildReason::ChecksumChanged,
            Some(_) => return Ok(None),
        };

        remove_generation_artifacts(artifact_path)?;
        write_checksum(&checksum_path, current)?;
        Ok(Some(reason))
    }
}

/// Names of loaded actions whose definition files have uncommitted changes, sorted.
fn changed_actions(catalog: &dyn ActionCatalog, actions: &ActionSet) -> Result<Vec<String>> {
    let pattern = format!("{ACTIONS_DIR}/*.{ACTION_FILE_EXTENSION}");
    let mut names: Vec<String> = catalog
        .list_changed(&pattern)?
        .iter()
        .filter_map(|path| action_name_from_path(path))
        .filter(|name| actions.contains(name))
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

fn fits(artifact: &Artifact, actions: &ActionSet) -> bool {
    artifact.describes(&actions.descriptions())
}

fn remove_artifact(path: &Path) -> Result<()> {
    if remove_file_if_exists(path)? {
        log::info!("Invalidated cached artifact {:?}", path);
    }
    Ok(())
}

/// The checksum record is shared by every language of a generation, so an invalidation
/// drops the artifacts of all of them.
fn remove_generation_artifacts(artifact_path: &Path) -> Result<()> {
    let Some(generation) = artifact_path.parent() else {
        return remove_artifact(artifact_path);
    };
    let entries = match std::fs::read_dir(generation) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(AgentError::storage(format!(
                "failed to list cache directory {generation:?}: {err}"
            )))
        }
    };
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(VOCABULARY_EXTENSION) {
            remove_artifact(&path)?;
        }
    }
    Ok(())
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(AgentError::storage(format!("failed to remove {path:?}: {err}"))),
    }
}
