use crate::error::Result;
use crate::loader::TemplateLoader;
use crate::tree::{LocalTree, SourceTree};
use log::debug;
use std::path::Path;

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    /// Opens the directory in place; it is never modified.
    fn load(&self) -> Result<Box<dyn SourceTree>> {
        debug!("Opening local template '{}'.", self.path.as_ref().display());
        Ok(Box::new(LocalTree::open(self.path.as_ref())?))
    }
}
