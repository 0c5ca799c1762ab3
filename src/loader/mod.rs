//! Template loading for stencil.
//! A template location is either a local directory, used in place, or a git repository,
//! shallow-cloned into a temporary directory that lives as long as the returned tree.

use crate::error::Result;
use crate::loader::git::GitLoader;
use crate::loader::local::LocalLoader;
use crate::tree::SourceTree;
use log::info;
use std::path::PathBuf;
use url::Url;

pub mod git;
pub mod local;

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Produces a readable tree for the template.
    ///
    /// # Errors
    /// * `Error::FetchError` if the template cannot be reached or read
    fn load(&self) -> Result<Box<dyn SourceTree>>;
}

/// Represents the source location of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocation {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS, git, or SSH)
    Git(String),
}

impl std::fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateLocation::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            TemplateLocation::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl TemplateLocation {
    /// Classifies a path-or-URL string.
    ///
    /// `https`, `http`, `git`, and `ssh` URLs and `git@host:path` shorthand are git
    /// repositories; anything else is a local path.
    pub fn parse(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "https" | "http" | "git" | "ssh") {
                return Self::Git(s.to_string());
            }
        }
        if s.starts_with("git@") {
            return Self::Git(s.to_string());
        }
        Self::FileSystem(PathBuf::from(s))
    }

    fn into_loader(self) -> Box<dyn TemplateLoader> {
        match self {
            TemplateLocation::Git(repo) => Box::new(GitLoader::new(repo)),
            TemplateLocation::FileSystem(path) => Box::new(LocalLoader::new(path)),
        }
    }
}

/// Loads the template at `template`, a local path or git URL.
pub fn load_template(template: &str) -> Result<Box<dyn SourceTree>> {
    let location = TemplateLocation::parse(template);
    info!("Using template from the {}", location);
    location.into_loader().load()
}
