use crate::cache::{CacheOutcome, PreparedArtifact};
use crate::error::{AgentError, Result};
use cobot_catalog::{ActionDef, ActionSet, AgentConfig};
use cobot_vector_store::Artifact;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAction {
    pub name: String,
    pub score: f64,
}

/// Immutable view of one loaded generation: agent configuration, action set and the artifact
/// built from it. Queries never block on rebuilds.
#[derive(Debug)]
pub struct IndexSnapshot {
    config: AgentConfig,
    actions: ActionSet,
    artifact: Artifact,
    version: String,
    path: PathBuf,
    outcome: CacheOutcome,
}

impl IndexSnapshot {
    pub(crate) fn new(config: AgentConfig, actions: ActionSet, prepared: PreparedArtifact) -> Self {
        Self {
            config,
            actions,
            artifact: prepared.artifact,
            version: prepared.version,
            path: prepared.path,
            outcome: prepared.outcome,
        }
    }

    /// Names of actions whose description scores at least `minimum_score` against `text`,
    /// best first.
    pub fn query_description(&self, text: &str, minimum_score: f64) -> Result<Vec<String>> {
        Ok(self
            .ranked_actions(text, minimum_score)?
            .into_iter()
            .map(|ranked| ranked.name)
            .collect())
    }

    pub fn ranked_actions(&self, text: &str, minimum_score: f64) -> Result<Vec<RankedAction>> {
        if !minimum_score.is_finite() || minimum_score < 0.0 {
            return Err(AgentError::InvalidScore(minimum_score));
        }
        let query = self.artifact.vocabulary.encode_text(text);
        let scored = self.artifact.index.query_scored(&query, minimum_score)?;
        log::debug!(
            "Query {:?} matched {} of {} actions",
            text,
            scored.len(),
            self.actions.len()
        );

        scored
            .into_iter()
            .map(|(id, score)| {
                let def = self.actions.get(id).ok_or_else(|| {
                    AgentError::Corrupt(format!("index entry {id} has no matching action"))
                })?;
                Ok(RankedAction {
                    name: def.name.clone(),
                    score,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&ActionDef> {
        self.actions.by_name(name)
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn agent_name(&self) -> &str {
        &self.config.agent.name
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn language(&self) -> &str {
        self.artifact.vocabulary.language()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn artifact_path(&self) -> &Path {
        &self.path
    }

    pub fn outcome(&self) -> &CacheOutcome {
        &self.outcome
    }

    pub fn term_count(&self) -> usize {
        self.artifact.vocabulary.len()
    }
}
