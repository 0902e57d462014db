use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const AGENT_CONFIG_PATH: &str = "agent-config.yaml";
pub const ACTIONS_DIR: &str = "actions";
pub const ACTION_FILE_EXTENSION: &str = "yaml";

/// Catalog path of the definition file for `name`.
#[must_use]
pub fn action_path(name: &str) -> String {
    format!("{ACTIONS_DIR}/{name}.{ACTION_FILE_EXTENSION}")
}

/// Action name for a catalog path produced by [`action_path`].
#[must_use]
pub fn action_name_from_path(path: &str) -> Option<&str> {
    path.strip_prefix(ACTIONS_DIR)?
        .strip_prefix('/')?
        .strip_suffix(ACTION_FILE_EXTENSION)?
        .strip_suffix('.')
        .filter(|name| !name.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDef {
    pub name: String,
    #[serde(default)]
    pub allow_reboot: bool,
    #[serde(default)]
    pub allow_privileged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Contents of `agent-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent: AgentDef,
    /// Ordered action entry list; positions become index ids.
    #[serde(default)]
    pub actions: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent: AgentDef {
                name: "default".to_string(),
                allow_reboot: false,
                allow_privileged: false,
                language: None,
            },
            actions: Vec::new(),
        }
    }
}

impl AgentConfig {
    pub fn from_yaml(bytes: &[u8]) -> Result<Self> {
        let config: Self = serde_yaml::from_slice(bytes)
            .map_err(|e| CatalogError::invalid_definition(AGENT_CONFIG_PATH, e))?;
        if config.agent.name.trim().is_empty() {
            return Err(CatalogError::invalid_definition(
                AGENT_CONFIG_PATH,
                "agent name is empty",
            ));
        }
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        serde_yaml::to_string(self)
            .map(String::into_bytes)
            .map_err(|e| CatalogError::invalid_definition(AGENT_CONFIG_PATH, e))
    }
}

/// Scalar value of an execution parameter. Lists and maps are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

/// Contents of `actions/<name>.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    #[serde(default)]
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default)]
    pub exec: ExecDef,
}

impl ActionDef {
    /// Parse and validate a definition read from `path`.
    pub fn from_yaml(path: &str, bytes: &[u8]) -> Result<Self> {
        let def: Self =
            serde_yaml::from_slice(bytes).map_err(|e| CatalogError::invalid_definition(path, e))?;
        if def.description.trim().is_empty() {
            return Err(CatalogError::invalid_definition(path, "description is empty"));
        }
        if let Some(key) = def.exec.parameters.keys().find(|k| k.trim().is_empty()) {
            return Err(CatalogError::invalid_definition(
                path,
                format!("parameter name {key:?} is empty"),
            ));
        }
        Ok(def)
    }

    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        serde_yaml::to_string(self)
            .map(String::into_bytes)
            .map_err(|e| CatalogError::invalid_definition(action_path(&self.name), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn action_paths_roundtrip_names() {
        assert_eq!(action_path("restart"), "actions/restart.yaml");
        assert_eq!(action_name_from_path("actions/restart.yaml"), Some("restart"));
        assert_eq!(action_name_from_path("actions/.yaml"), None);
        assert_eq!(action_name_from_path("plugins/restart.yaml"), None);
        assert_eq!(action_name_from_path("actions/restart.yml"), None);
    }

    #[test]
    fn parses_full_action_definition() {
        let yaml = br#"
name: restart
description: Restart the web server
args: [service]
exec:
  plugin: systemd
  parameters:
    unit: nginx
    timeout: 30
    force: false
    backoff: 1.5
"#;
        let def = ActionDef::from_yaml("actions/restart.yaml", yaml).unwrap();
        assert_eq!(def.name, "restart");
        assert_eq!(def.args, vec!["service"]);
        assert_eq!(def.exec.plugin.as_deref(), Some("systemd"));
        assert_eq!(
            def.exec.parameters.get("unit"),
            Some(&ParamValue::Text("nginx".into()))
        );
        assert_eq!(def.exec.parameters.get("timeout"), Some(&ParamValue::Integer(30)));
        assert_eq!(def.exec.parameters.get("force"), Some(&ParamValue::Bool(false)));
        assert_eq!(def.exec.parameters.get("backoff"), Some(&ParamValue::Float(1.5)));
    }

    #[test]
    fn minimal_definition_uses_defaults() {
        let def = ActionDef::from_yaml("actions/ls.yaml", b"description: list files\n").unwrap();
        assert!(def.name.is_empty());
        assert!(def.args.is_empty());
        assert_eq!(def.exec, ExecDef::default());
    }

    #[test]
    fn nested_parameter_values_are_rejected() {
        let yaml = b"description: x\nexec:\n  parameters:\n    hosts: [a, b]\n";
        let err = ActionDef::from_yaml("actions/x.yaml", yaml).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidDefinition { ref path, .. } if path == "actions/x.yaml"
        ));
    }

    #[test]
    fn empty_description_is_rejected() {
        assert!(ActionDef::from_yaml("actions/x.yaml", b"name: x\ndescription: '  '\n").is_err());
        assert!(ActionDef::from_yaml("actions/x.yaml", b"name: x\n").is_err());
    }

    #[test]
    fn agent_config_roundtrip_and_validation() {
        let config = AgentConfig::default();
        let parsed = AgentConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, config);

        let blank = b"agent:\n  name: ''\nactions: []\n";
        assert!(AgentConfig::from_yaml(blank).is_err());

        let with_language = b"agent:\n  name: ops\n  language: spanish\nactions: [a, b]\n";
        let parsed = AgentConfig::from_yaml(with_language).unwrap();
        assert_eq!(parsed.agent.language.as_deref(), Some("spanish"));
        assert_eq!(parsed.actions, vec!["a", "b"]);
    }

    #[test]
    fn param_values_display_plainly() {
        assert_eq!(ParamValue::Text("nginx".into()).to_string(), "nginx");
        assert_eq!(ParamValue::Integer(3).to_string(), "3");
        assert_eq!(ParamValue::Bool(true).to_string(), "true");
    }
}
