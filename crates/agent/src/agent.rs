use crate::action_index::ActionIndex;
use crate::cache::CacheOutcome;
use crate::error::{AgentError, Result};
use crate::snapshot::{IndexSnapshot, RankedAction};
use cobot_catalog::layout::default_cache_dir;
use cobot_catalog::{ActionCatalog, ActionDef, GitCatalog};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_STORAGE_PATH: &str = "./.data";
pub const DEFAULT_MINIMUM_SCORE: f64 = 0.5;

/// Runner-up matches reported alongside a similarity match.
const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    pub storage_path: PathBuf,
    /// Overrides `agent.language` from `agent-config.yaml`. Without it the configured
    /// language is re-read on every refresh.
    pub language: Option<String>,
    pub minimum_score: f64,
    /// Defaults to `<storage>/local/cache`.
    pub cache_dir: Option<PathBuf>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            language: None,
            minimum_score: DEFAULT_MINIMUM_SCORE,
            cache_dir: None,
        }
    }
}

impl AgentOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.minimum_score.is_finite() || self.minimum_score < 0.0 {
            return Err(AgentError::InvalidScore(self.minimum_score));
        }
        if self.language.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(AgentError::ConfigInvalid("language is empty".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| default_cache_dir(&self.storage_path))
    }
}

/// What an input line resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The input is exactly an action name.
    Exact(ActionDef),
    /// Best description match at or above the minimum score.
    Similar {
        action: ActionDef,
        score: f64,
        alternatives: Vec<RankedAction>,
    },
    NoMatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub agent: String,
    pub language: String,
    pub version: String,
    pub dirty: bool,
    pub actions: usize,
    pub terms: usize,
    pub artifact: PathBuf,
    pub cache: String,
}

pub struct Agent {
    options: AgentOptions,
    index: ActionIndex,
}

impl Agent {
    /// Open the git-backed storage at `options.storage_path`.
    pub fn open(options: AgentOptions) -> Result<Self> {
        options.validate()?;
        let catalog = GitCatalog::open(&options.storage_path)?;
        Self::with_catalog(options, Arc::new(catalog))
    }

    pub fn with_catalog(options: AgentOptions, catalog: Arc<dyn ActionCatalog>) -> Result<Self> {
        options.validate()?;
        let index = ActionIndex::open(catalog, options.cache_dir(), options.language.clone())?;
        Ok(Self { options, index })
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn index(&self) -> &ActionIndex {
        &self.index
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.index.snapshot()
    }

    /// Resolve one input line against the action set.
    pub fn dispatch(&self, input: &str) -> Result<Dispatch> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Dispatch::NoMatch);
        }
        let snapshot = self.index.snapshot();
        if let Some(def) = snapshot.action(input) {
            return Ok(Dispatch::Exact(def.clone()));
        }

        let mut ranked = snapshot
            .ranked_actions(input, self.options.minimum_score)?
            .into_iter();
        let Some(best) = ranked.next() else {
            return Ok(Dispatch::NoMatch);
        };
        let action = snapshot
            .action(&best.name)
            .cloned()
            .ok_or_else(|| AgentError::NotFound(best.name.clone()))?;
        Ok(Dispatch::Similar {
            action,
            score: best.score,
            alternatives: ranked.take(MAX_ALTERNATIVES).collect(),
        })
    }

    pub fn greeting(&self) -> String {
        format!("Hello! Agent {} ready.", self.index.snapshot().agent_name())
    }

    pub fn farewell(&self) -> String {
        format!("Bye! Agent {} shutting down.", self.index.snapshot().agent_name())
    }

    pub fn refresh(&self) -> Result<Arc<IndexSnapshot>> {
        self.index.refresh()
    }

    pub fn rebuild(&self) -> Result<Arc<IndexSnapshot>> {
        self.index.rebuild()
    }

    pub fn status(&self) -> Result<AgentStatus> {
        let snapshot = self.index.snapshot();
        Ok(AgentStatus {
            agent: snapshot.agent_name().to_string(),
            language: snapshot.language().to_string(),
            version: snapshot.version().to_string(),
            dirty: self.index.catalog().has_uncommitted_changes()?,
            actions: snapshot.actions().len(),
            terms: snapshot.term_count(),
            artifact: snapshot.artifact_path().to_path_buf(),
            cache: match snapshot.outcome() {
                CacheOutcome::Loaded => "loaded".to_string(),
                CacheOutcome::Built(reason) => format!("built ({reason})"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_reject_bad_scores() {
        let mut options = AgentOptions::default();
        assert!(options.validate().is_ok());

        options.minimum_score = -0.1;
        assert!(matches!(options.validate(), Err(AgentError::InvalidScore(_))));
        options.minimum_score = f64::NAN;
        assert!(matches!(options.validate(), Err(AgentError::InvalidScore(_))));
        options.minimum_score = 1.5;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn cache_dir_defaults_under_storage() {
        let options = AgentOptions {
            storage_path: PathBuf::from("/srv/agent"),
            ..AgentOptions::default()
        };
        assert_eq!(options.cache_dir(), PathBuf::from("/srv/agent/local/cache"));

        let custom = AgentOptions {
            cache_dir: Some(PathBuf::from("/tmp/c")),
            ..options
        };
        assert_eq!(custom.cache_dir(), PathBuf::from("/tmp/c"));
    }
}
