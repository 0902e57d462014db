use crate::catalog::ActionCatalog;
use crate::definitions::{action_path, ActionDef, AgentConfig, AGENT_CONFIG_PATH};
use crate::error::Result;
use std::collections::HashMap;

/// Read `agent-config.yaml`, writing the default configuration first when it is missing.
pub fn load_or_create_agent_config(catalog: &dyn ActionCatalog) -> Result<AgentConfig> {
    if !catalog.exists(AGENT_CONFIG_PATH) {
        log::info!("{AGENT_CONFIG_PATH} not found, creating default configuration");
        let config = AgentConfig::default();
        catalog.write_bytes(AGENT_CONFIG_PATH, &config.to_yaml()?)?;
        return Ok(config);
    }
    AgentConfig::from_yaml(&catalog.read_bytes(AGENT_CONFIG_PATH)?)
}

/// Loaded action definitions in configuration order. Position in the set is the entry id
/// used by the similarity index.
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: Vec<ActionDef>,
    by_name: HashMap<String, usize>,
}

impl ActionSet {
    /// Load every action listed in `config`. Entries that are missing, malformed or listed
    /// twice are logged and skipped.
    pub fn load(catalog: &dyn ActionCatalog, config: &AgentConfig) -> Self {
        let mut set = Self::default();
        for name in &config.actions {
            if set.by_name.contains_key(name) {
                log::warn!("Action {name:?} is listed more than once, keeping the first");
                continue;
            }
            let path = action_path(name);
            let bytes = match catalog.read_bytes(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!("Skipping action {name:?}: {err}");
                    continue;
                }
            };
            match ActionDef::from_yaml(&path, &bytes) {
                Ok(mut def) => {
                    if def.name.is_empty() {
                        def.name = name.clone();
                    } else if def.name != *name {
                        log::debug!(
                            "Action file {path} declares name {:?}, using {name:?}",
                            def.name
                        );
                        def.name = name.clone();
                    }
                    set.push(def);
                }
                Err(err) => log::warn!("Skipping action {name:?}: {err}"),
            }
        }
        log::debug!(
            "Loaded {} of {} configured actions",
            set.len(),
            config.actions.len()
        );
        set
    }

    /// Build a set directly from definitions, skipping duplicate names.
    #[must_use]
    pub fn from_defs(defs: impl IntoIterator<Item = ActionDef>) -> Self {
        let mut set = Self::default();
        for def in defs {
            if !set.by_name.contains_key(&def.name) {
                set.push(def);
            }
        }
        set
    }

    fn push(&mut self, def: ActionDef) {
        self.by_name.insert(def.name.clone(), self.actions.len());
        self.actions.push(def);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.actions.iter()
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&ActionDef> {
        self.actions.get(id)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ActionDef> {
        self.position(name).and_then(|id| self.actions.get(id))
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|def| def.name.as_str())
    }

    /// Descriptions in id order; the corpus the vocabulary is built from.
    #[must_use]
    pub fn descriptions(&self) -> Vec<&str> {
        self.actions.iter().map(|def| def.description.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCatalog;
    use pretty_assertions::assert_eq;

    fn config(actions: &[&str]) -> AgentConfig {
        AgentConfig {
            actions: actions.iter().map(|s| s.to_string()).collect(),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn missing_and_malformed_entries_are_skipped() {
        let catalog = MemoryCatalog::new();
        catalog
            .write_bytes("actions/restart.yaml", b"description: restart the server\n")
            .unwrap();
        catalog
            .write_bytes("actions/broken.yaml", b"description: [unclosed\n")
            .unwrap();
        catalog
            .write_bytes("actions/ps.yaml", b"name: other\ndescription: list running processes\n")
            .unwrap();

        let listed = config(&["restart", "missing", "broken", "ps", "restart"]);
        let set = ActionSet::load(&catalog, &listed);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["restart", "ps"]);
        assert_eq!(
            set.descriptions(),
            vec!["restart the server", "list running processes"]
        );
        assert_eq!(set.position("ps"), Some(1));
        assert!(set.by_name("broken").is_none());
        assert_eq!(set.get(0).map(|d| d.name.as_str()), Some("restart"));
    }

    #[test]
    fn default_config_is_written_when_missing() {
        let catalog = MemoryCatalog::new();
        let config = load_or_create_agent_config(&catalog).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert!(catalog.exists(AGENT_CONFIG_PATH));

        let again = load_or_create_agent_config(&catalog).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn invalid_agent_config_is_an_error() {
        let catalog = MemoryCatalog::new();
        catalog.write_bytes(AGENT_CONFIG_PATH, b"agent: [").unwrap();
        assert!(load_or_create_agent_config(&catalog).is_err());
    }
}
