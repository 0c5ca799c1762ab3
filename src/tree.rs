//! Read-only view of a template source.
//! The engine only ever talks to a [`SourceTree`]; whether the files live in a local
//! directory, a fresh clone, or memory is decided once, when the tree is constructed.

use crate::error::{Error, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// One file or directory of a template, relative to the tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    /// Permission bits as reported by the source
    pub mode: u32,
}

/// Capability the engine needs from a template source.
pub trait SourceTree: std::fmt::Debug {
    /// Human-readable location used in logs and errors.
    fn location(&self) -> String;

    /// Every entry below the root, parents before children, siblings sorted by name.
    fn entries(&self) -> Result<Vec<SourceEntry>>;

    /// Names of the immediate subdirectories, sorted.
    fn children(&self) -> Result<Vec<String>>;

    /// Whether `path` names a regular file in this tree.
    fn contains_file(&self, path: &Path) -> bool;

    /// Reads the bytes of the file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// A new tree rooted at the immediate subdirectory `name`.
    fn narrow(&self, name: &str) -> Result<Box<dyn SourceTree>>;
}

fn fetch_error(location: impl Into<String>, reason: impl ToString) -> Error {
    Error::FetchError { location: location.into(), reason: reason.to_string() }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() {
        DEFAULT_DIR_MODE
    } else {
        DEFAULT_FILE_MODE
    }
}

/// A template directory on the local filesystem, used in place.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    /// Opens `root` as a template tree.
    ///
    /// # Errors
    /// * `Error::FetchError` if `root` is missing or not a directory
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(fetch_error(root.display().to_string(), "template directory does not exist"));
        }
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn narrow_local(&self, name: &str) -> Result<Self> {
        if !is_plain_name(name) {
            return Err(fetch_error(self.location(), format!("'{name}' is not a directory name")));
        }
        Self::open(self.root.join(name))
    }
}

impl SourceTree for LocalTree {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn entries(&self) -> Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for dir_entry in WalkDir::new(&self.root).min_depth(1).follow_links(true).sort_by_file_name() {
            let dir_entry = dir_entry.map_err(|e| fetch_error(self.location(), e))?;
            let metadata = dir_entry.metadata().map_err(|e| fetch_error(self.location(), e))?;
            let path = dir_entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| fetch_error(self.location(), e))?
                .to_path_buf();
            entries.push(SourceEntry { path, is_dir: metadata.is_dir(), mode: mode_of(&metadata) });
        }
        Ok(entries)
    }

    fn children(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| fetch_error(self.location(), e))? {
            let entry = entry.map_err(|e| fetch_error(self.location(), e))?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!("Skipping non UTF-8 directory {:?} in {}", name, self.location()),
            }
        }
        names.sort();
        Ok(names)
    }

    fn contains_file(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        fs::read(&full).map_err(|e| fetch_error(full.display().to_string(), e))
    }

    fn narrow(&self, name: &str) -> Result<Box<dyn SourceTree>> {
        Ok(Box::new(self.narrow_local(name)?))
    }
}

/// A snapshot cloned into a temporary directory.
///
/// The directory is removed once this tree and every tree narrowed from it are dropped.
#[derive(Debug, Clone)]
pub struct ClonedTree {
    origin: String,
    checkout: Arc<TempDir>,
    inner: LocalTree,
}

impl ClonedTree {
    pub fn new(origin: impl Into<String>, checkout: TempDir) -> Result<Self> {
        let inner = LocalTree::open(checkout.path())?;
        Ok(Self { origin: origin.into(), checkout: Arc::new(checkout), inner })
    }

    pub fn root(&self) -> &Path {
        self.inner.root()
    }
}

impl SourceTree for ClonedTree {
    fn location(&self) -> String {
        self.origin.clone()
    }

    fn entries(&self) -> Result<Vec<SourceEntry>> {
        self.inner.entries()
    }

    fn children(&self) -> Result<Vec<String>> {
        self.inner.children()
    }

    fn contains_file(&self, path: &Path) -> bool {
        self.inner.contains_file(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn narrow(&self, name: &str) -> Result<Box<dyn SourceTree>> {
        Ok(Box::new(Self {
            origin: format!("{}/{}", self.origin, name),
            checkout: Arc::clone(&self.checkout),
            inner: self.inner.narrow_local(name)?,
        }))
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    Dir { mode: u32 },
    File { content: Vec<u8>, mode: u32 },
}

/// A template held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    location: String,
    nodes: BTreeMap<PathBuf, MemoryNode>,
}

impl MemoryTree {
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into(), nodes: BTreeMap::new() }
    }

    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_parents(path.as_ref());
        self.nodes
            .entry(path.as_ref().to_path_buf())
            .or_insert(MemoryNode::Dir { mode: DEFAULT_DIR_MODE });
        self
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.with_file_mode(path, content, DEFAULT_FILE_MODE)
    }

    pub fn with_file_mode(
        mut self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        mode: u32,
    ) -> Self {
        self.add_parents(path.as_ref());
        self.nodes
            .insert(path.as_ref().to_path_buf(), MemoryNode::File { content: content.into(), mode });
        self
    }

    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(MemoryNode::Dir { mode: DEFAULT_DIR_MODE });
        }
    }
}

impl SourceTree for MemoryTree {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn entries(&self) -> Result<Vec<SourceEntry>> {
        Ok(self
            .nodes
            .iter()
            .map(|(path, node)| match node {
                MemoryNode::Dir { mode } => SourceEntry { path: path.clone(), is_dir: true, mode: *mode },
                MemoryNode::File { mode, .. } => {
                    SourceEntry { path: path.clone(), is_dir: false, mode: *mode }
                }
            })
            .collect())
    }

    fn children(&self) -> Result<Vec<String>> {
        Ok(self
            .nodes
            .iter()
            .filter(|(path, node)| {
                matches!(node, MemoryNode::Dir { .. }) && path.components().count() == 1
            })
            .map(|(path, _)| path.to_string_lossy().into_owned())
            .collect())
    }

    fn contains_file(&self, path: &Path) -> bool {
        matches!(self.nodes.get(path), Some(MemoryNode::File { .. }))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.nodes.get(path) {
            Some(MemoryNode::File { content, .. }) => Ok(content.clone()),
            _ => Err(fetch_error(
                format!("{}/{}", self.location, path.display()),
                "no such file",
            )),
        }
    }

    fn narrow(&self, name: &str) -> Result<Box<dyn SourceTree>> {
        if !matches!(self.nodes.get(Path::new(name)), Some(MemoryNode::Dir { .. })) {
            return Err(fetch_error(self.location(), format!("'{name}' is not a directory")));
        }
        let nodes = self
            .nodes
            .iter()
            .filter_map(|(path, node)| {
                path.strip_prefix(name)
                    .ok()
                    .filter(|rel| !rel.as_os_str().is_empty())
                    .map(|rel| (rel.to_path_buf(), node.clone()))
            })
            .collect();
        Ok(Box::new(Self { location: format!("{}/{}", self.location, name), nodes }))
    }
}
