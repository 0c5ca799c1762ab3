//! File and directory ignore rules for stencil templates.
//! Template metadata (prompt and override files) and version-control or package-manager
//! directories are never copied to the output. Callers may add their own glob patterns.

use crate::constants::{IGNORED_DIRECTORIES, OVERRIDE_FILE, PROMPT_FILE};
use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Compiled set of ignore patterns.
///
/// A path is ignored when it, or any of its ancestors, matches a pattern.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    globs: GlobSet,
}

impl IgnoreRules {
    /// Builds the always-ignored set plus `extra` glob patterns.
    ///
    /// # Errors
    /// * `Error::ConfigFormatError` if a pattern is not a valid glob
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self> {
        let always = [PROMPT_FILE, OVERRIDE_FILE]
            .into_iter()
            .chain(IGNORED_DIRECTORIES)
            .map(|name| format!("**/{name}"));

        let mut builder = GlobSetBuilder::new();
        for pattern in always.chain(extra.iter().map(|p| p.as_ref().to_string())) {
            let glob = GlobBuilder::new(&pattern).literal_separator(true).build().map_err(|e| {
                Error::ConfigFormatError {
                    path: PathBuf::from(&pattern),
                    reason: format!("invalid ignore pattern: {e}"),
                }
            })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|e| Error::ConfigFormatError {
            path: PathBuf::from("<ignore patterns>"),
            reason: e.to_string(),
        })?;
        Ok(Self { globs })
    }

    /// Whether `path` (relative to the template root) is excluded from the output.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.ancestors()
            .take_while(|p| !p.as_os_str().is_empty())
            .any(|p| self.globs.is_match(p))
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        let none: [&str; 0] = [];
        // The built-in patterns are constants and always compile.
        Self::new(&none).unwrap_or_else(|_| Self { globs: GlobSet::empty() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_metadata_is_ignored() {
        let rules = IgnoreRules::default();
        assert!(rules.is_ignored(Path::new("prompts.toml")));
        assert!(rules.is_ignored(Path::new(".override.toml")));
        assert!(rules.is_ignored(Path::new("nested/prompts.toml")));
        assert!(!rules.is_ignored(Path::new("prompts.toml.bak")));
        assert!(!rules.is_ignored(Path::new("template.go")));
    }

    #[test]
    fn test_vcs_directories_and_their_contents_are_ignored() {
        let rules = IgnoreRules::default();
        assert!(rules.is_ignored(Path::new(".git")));
        assert!(rules.is_ignored(Path::new(".git/objects/ab/cdef")));
        assert!(rules.is_ignored(Path::new("web/node_modules/left-pad/index.js")));
        assert!(!rules.is_ignored(Path::new(".github/workflows/ci.yml")));
        assert!(!rules.is_ignored(Path::new(".gitignore")));
    }

    #[test]
    fn test_extra_patterns() {
        let rules = IgnoreRules::new(&["*.pyc", "docs"]).unwrap();
        assert!(rules.is_ignored(Path::new("module.pyc")));
        assert!(!rules.is_ignored(Path::new("pkg/module.pyc")));
        assert!(rules.is_ignored(Path::new("docs/index.md")));
        assert!(!rules.is_ignored(Path::new("src/docs.rs")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(IgnoreRules::new(&["a[b"]).is_err());
    }
}
