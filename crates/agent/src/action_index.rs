use crate::cache::CacheManager;
use crate::error::Result;
use crate::snapshot::IndexSnapshot;
use cobot_catalog::{load_or_create_agent_config, ActionCatalog, ActionSet, AgentConfig};
use cobot_vector_store::Tokenizer;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

pub const DEFAULT_LANGUAGE: &str = "english";

/// Handle owning the catalog, the cache root and the current [`IndexSnapshot`].
///
/// Readers take an `Arc` to the snapshot and query without holding any lock. Rebuilds are
/// serialized by a separate mutex and swap the finished snapshot in.
///
/// The index language is resolved on every load: the fixed `language` when given, else
/// `agent.language` from the configuration read for that load, else [`DEFAULT_LANGUAGE`].
pub struct ActionIndex {
    catalog: Arc<dyn ActionCatalog>,
    cache_root: PathBuf,
    language: Option<String>,
    current: RwLock<Arc<IndexSnapshot>>,
    rebuild_lock: Mutex<()>,
}

impl ActionIndex {
    /// Load the agent configuration and action set, then build or load the artifact.
    pub fn open(
        catalog: Arc<dyn ActionCatalog>,
        cache_root: impl Into<PathBuf>,
        language: Option<String>,
    ) -> Result<Self> {
        let cache_root = cache_root.into();
        let snapshot = load_snapshot(catalog.as_ref(), &cache_root, language.as_deref(), false)?;
        Ok(Self {
            catalog,
            cache_root,
            language,
            current: RwLock::new(Arc::new(snapshot)),
            rebuild_lock: Mutex::new(()),
        })
    }

    /// Current snapshot. Cheap; the returned snapshot stays valid across later swaps.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Re-read the catalog and run the cache protocol again, replacing the snapshot.
    pub fn refresh(&self) -> Result<Arc<IndexSnapshot>> {
        self.reload(false)
    }

    /// Like [`refresh`](Self::refresh), but always rebuilds the artifact.
    pub fn rebuild(&self) -> Result<Arc<IndexSnapshot>> {
        self.reload(true)
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn catalog(&self) -> &dyn ActionCatalog {
        self.catalog.as_ref()
    }

    fn reload(&self, force: bool) -> Result<Arc<IndexSnapshot>> {
        let _rebuilding = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot = load_snapshot(
            self.catalog.as_ref(),
            &self.cache_root,
            self.language.as_deref(),
            force,
        )?;
        let snapshot = Arc::new(snapshot);
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Arc::clone(&snapshot);
        Ok(snapshot)
    }
}

fn resolve_language(fixed: Option<&str>, config: &AgentConfig) -> String {
    let language = fixed
        .or(config.agent.language.as_deref())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string();
    if !Tokenizer::new(language.as_str()).has_stemmer() {
        log::warn!("No stemmer for language {language:?}, tokens are used unstemmed");
    }
    language
}

fn load_snapshot(
    catalog: &dyn ActionCatalog,
    cache_root: &Path,
    language: Option<&str>,
    force: bool,
) -> Result<IndexSnapshot> {
    let config = load_or_create_agent_config(catalog)?;
    let actions = ActionSet::load(catalog, &config);
    let cache = CacheManager::new(cache_root, resolve_language(language, &config));
    let prepared = if force {
        cache.force_rebuild(catalog, &actions)?
    } else {
        cache.prepare(catalog, &actions)?
    };
    Ok(IndexSnapshot::new(config, actions, prepared))
}
