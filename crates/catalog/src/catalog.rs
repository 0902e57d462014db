use crate::error::{CatalogError, Result};
use globset::{Glob, GlobMatcher};

/// Version reported by a catalog that has no history yet.
pub const DEFAULT_VERSION_ID: &str = "v0.0.0";

/// Versioned store of action definitions.
///
/// Paths are `/`-separated and relative to the catalog root.
pub trait ActionCatalog: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>>;

    fn write_bytes(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Paths with uncommitted modifications matching `pattern`, sorted.
    fn list_changed(&self, pattern: &str) -> Result<Vec<String>>;

    /// Content identifier of the whole catalog tree.
    fn current_version_id(&self) -> Result<String>;

    fn has_uncommitted_changes(&self) -> Result<bool>;
}

/// Compile a change-listing pattern. `*` matches any run of characters, `/` included.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| CatalogError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
