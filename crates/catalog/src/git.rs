use crate::catalog::{compile_pattern, ActionCatalog, DEFAULT_VERSION_ID};
use crate::error::{CatalogError, Result};
use crate::layout::init_storage_layout;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Output};

/// Catalog backed by a directory inside a git work tree.
///
/// Reads and writes go straight to the filesystem; history questions are answered by the
/// `git` binary. The root may be a subdirectory of the repository, in which case change
/// listings are reported relative to the root and exclude paths outside it.
#[derive(Debug, Clone)]
pub struct GitCatalog {
    root: PathBuf,
    /// Root relative to the repository top level, `/`-terminated or empty.
    prefix: String,
}

impl GitCatalog {
    /// Open `root`, failing with [`CatalogError::Unavailable`] when it is not inside a git
    /// work tree.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CatalogError::unavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let inside = git_stdout(&root, &["rev-parse", "--is-inside-work-tree"])?;
        if inside != "true" {
            return Err(CatalogError::unavailable(format!(
                "{} is not inside a git work tree",
                root.display()
            )));
        }
        let prefix = git_stdout(&root, &["rev-parse", "--show-prefix"])?;
        log::debug!("Opened git catalog at {:?} (prefix {:?})", root, prefix);
        Ok(Self { root, prefix })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the missing parts of the storage layout under the root.
    pub fn init_layout(&self) -> Result<Vec<PathBuf>> {
        init_storage_layout(&self.root)
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

impl ActionCatalog for GitCatalog {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        std::fs::read(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CatalogError::NotFound(path.to_string()),
            _ => CatalogError::IoError(e),
        })
    }

    fn write_bytes(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = full.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        if let Err(err) = std::fs::rename(&tmp, &full) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn list_changed(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = compile_pattern(pattern)?;
        let output = git_output(
            &self.root,
            &["status", "--porcelain", "-z", "--untracked-files=all", "--", "."],
        )?;
        if !output.status.success() {
            return Err(git_failure("status", &output));
        }

        let mut changed: Vec<String> = parse_porcelain_z(&output.stdout)
            .into_iter()
            .filter_map(|path| self.strip_prefix(&path).map(str::to_string))
            .filter(|path| matcher.is_match(path.as_str()))
            .collect();
        changed.sort();
        changed.dedup();
        Ok(changed)
    }

    fn current_version_id(&self) -> Result<String> {
        let output = git_output(&self.root, &["rev-parse", "--verify", "--quiet", "HEAD"])?;
        if !output.status.success() {
            // Unborn branch: no commits yet.
            return Ok(DEFAULT_VERSION_ID.to_string());
        }
        let head = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if head.is_empty() {
            return Ok(DEFAULT_VERSION_ID.to_string());
        }
        Ok(head)
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        let output = git_output(&self.root, &["status", "--porcelain", "-z", "--", "."])?;
        if !output.status.success() {
            return Err(git_failure("status", &output));
        }
        Ok(!output.stdout.is_empty())
    }
}

/// Current paths from `git status --porcelain -z`. The origin of a rename or copy is skipped.
fn parse_porcelain_z(stdout: &[u8]) -> Vec<String> {
    let mut tokens = stdout.split(|b| *b == 0).filter(|s| !s.is_empty());
    let mut paths = Vec::new();
    while let Some(token) = tokens.next() {
        if token.len() < 4 {
            continue;
        }
        let (status, path) = token.split_at(3);
        paths.push(String::from_utf8_lossy(path).into_owned());
        if matches!(status[0], b'R' | b'C') {
            tokens.next();
        }
    }
    paths
}

fn git_output(root: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .map_err(|e| CatalogError::unavailable(format!("failed to run git: {e}")))
}

fn git_stdout(root: &Path, args: &[&str]) -> Result<String> {
    let output = git_output(root, args)?;
    if !output.status.success() {
        return Err(git_failure(args.first().copied().unwrap_or("git"), &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn git_failure(what: &str, output: &Output) -> CatalogError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    CatalogError::unavailable(format!("git {what} failed: {}", stderr.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn porcelain_parser_skips_rename_origins() {
        let out = b"?? actions/new.yaml\0R  actions/b.yaml\0actions/a.yaml\0 M agent-config.yaml\0";
        assert_eq!(
            parse_porcelain_z(out),
            vec!["actions/new.yaml", "actions/b.yaml", "agent-config.yaml"]
        );
    }

    #[test]
    fn porcelain_parser_ignores_garbage() {
        assert!(parse_porcelain_z(b"").is_empty());
        assert!(parse_porcelain_z(b"\0\0M\0").is_empty());
    }

    #[test]
    fn open_rejects_missing_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = GitCatalog::open(tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
