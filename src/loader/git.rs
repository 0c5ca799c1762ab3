use crate::error::{Error, Result};
use crate::loader::TemplateLoader;
use crate::tree::{ClonedTree, SourceTree};
use log::debug;

/// Loader for templates from git repositories.
pub struct GitLoader<S: AsRef<str>> {
    repo: S,
}

impl<S: AsRef<str>> GitLoader<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    fn fetch_error(&self, reason: impl ToString) -> Error {
        Error::FetchError { location: self.repo.as_ref().to_string(), reason: reason.to_string() }
    }
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<S> {
    /// Shallow-clones the repository into a temporary directory.
    ///
    /// The directory is owned by the returned tree and removed when it is dropped.
    fn load(&self) -> Result<Box<dyn SourceTree>> {
        let repo_url = self.repo.as_ref();
        let checkout = tempfile::Builder::new()
            .prefix("stencil")
            .tempdir()
            .map_err(|e| self.fetch_error(e))?;

        debug!("Cloning repository '{}' to '{}'.", repo_url, checkout.path().display());

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
        });

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);
        fetch_opts.depth(1);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(repo_url, checkout.path()).map_err(|e| self.fetch_error(e.message()))?;

        Ok(Box::new(ClonedTree::new(repo_url, checkout)?))
    }
}
