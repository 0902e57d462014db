//! # Cobot Agent
//!
//! Keeps the similarity index in sync with the action catalog and resolves user input to
//! actions.
//!
//! ```text
//! ActionCatalog ──> ActionSet ──> CacheManager::prepare ──> IndexSnapshot
//!                                   │  checksum of uncommitted changes
//!                                   └─ <cache>/<version>/<language>.vocabulary
//! ```
//!
//! [`ActionIndex`] owns the current snapshot and swaps it atomically on refresh, so
//! queries never observe a half-built index. [`Agent`] adds option handling and dispatch.

mod action_index;
mod agent;
mod cache;
mod checksum;
mod error;
mod paths;
mod snapshot;

pub use action_index::{ActionIndex, DEFAULT_LANGUAGE};
pub use agent::{
    Agent, AgentOptions, AgentStatus, Dispatch, DEFAULT_MINIMUM_SCORE, DEFAULT_STORAGE_PATH,
};
pub use cache::{BuildReason, CacheManager, CacheOutcome, PreparedArtifact};
pub use checksum::{actions_checksum, read_checksum, write_checksum};
pub use error::{AgentError, Result};
pub use paths::{CacheLayout, CHECKSUM_FILE, VOCABULARY_EXTENSION};
pub use snapshot::{IndexSnapshot, RankedAction};
