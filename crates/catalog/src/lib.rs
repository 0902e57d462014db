//! # Cobot Catalog
//!
//! Versioned store of action definitions.
//!
//! - [`ActionCatalog`]: the storage contract (read/write, change listing, version oracle)
//! - [`GitCatalog`]: a directory inside a git work tree, queried through the `git` binary
//! - [`MemoryCatalog`]: in-memory implementation for tests and embedders
//! - [`ActionSet`]: the ordered, validated action definitions listed in `agent-config.yaml`

mod action_set;
mod catalog;
pub mod definitions;
mod error;
mod git;
pub mod layout;
mod memory;

pub use action_set::{load_or_create_agent_config, ActionSet};
pub use catalog::{compile_pattern, ActionCatalog, DEFAULT_VERSION_ID};
pub use definitions::{ActionDef, AgentConfig, AgentDef, ExecDef, ParamValue};
pub use error::{CatalogError, Result};
pub use git::GitCatalog;
pub use memory::MemoryCatalog;
