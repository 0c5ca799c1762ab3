//! Template tree processing.
//! Processing happens in two steps: a [`WalkPlan`] decides, without touching the output,
//! which entries survive the ignore rules and where each lands; the [`Materializer`] then
//! renders every surviving file in memory and only afterwards writes the output tree.

use crate::bindings::VariableBindings;
use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;
use crate::renderer::{has_template_syntax, TemplateRenderer};
use crate::sniff::ContentSniffer;
use crate::tree::{SourceEntry, SourceTree};
use log::{debug, info};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// What happens to one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Matched an ignore rule
    Ignored,
    /// A path segment rendered to an empty name
    Omitted,
    /// Written to this path, relative to the output directory
    Target(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub source: SourceEntry,
    pub disposition: Disposition,
}

/// Renders every segment of `relative` into an output path.
///
/// # Returns
/// * `Ok(None)` if any segment renders to an empty name
///
/// # Errors
/// * `Error::SubstitutionError` if a segment fails to render or would leave the output
///   directory (`..`, `.`, or an absolute path)
pub fn render_target_path(
    relative: &Path,
    renderer: &dyn TemplateRenderer,
    bindings: &VariableBindings,
) -> Result<Option<PathBuf>> {
    let display = relative.display().to_string();
    let mut target = PathBuf::new();
    for component in relative.components() {
        let Some(segment) = component.as_os_str().to_str() else {
            if has_template_syntax(&component.as_os_str().to_string_lossy()) {
                return Err(Error::SubstitutionError {
                    path: display,
                    reason: "a segment with variable references must be valid UTF-8".to_string(),
                });
            }
            target.push(component);
            continue;
        };
        let rendered = renderer.render(segment, bindings, &display)?;
        if rendered.trim().is_empty() {
            return Ok(None);
        }
        if !is_rendered_segment_valid(&rendered) {
            return Err(Error::SubstitutionError {
                path: display,
                reason: format!("segment renders to '{rendered}', which leaves the output directory"),
            });
        }
        target.push(rendered);
    }
    Ok(Some(target))
}

/// A rendered segment may introduce nested directories but never `.`, `..`, or a root.
pub fn is_rendered_segment_valid(rendered: &str) -> bool {
    Path::new(rendered).components().all(|c| matches!(c, Component::Normal(_)))
}

/// Lazy, single-pass plan over a template's entries.
pub struct WalkPlan<'a> {
    entries: std::vec::IntoIter<SourceEntry>,
    ignore: &'a IgnoreRules,
    renderer: &'a dyn TemplateRenderer,
    bindings: &'a VariableBindings,
}

impl<'a> WalkPlan<'a> {
    pub fn new(
        entries: Vec<SourceEntry>,
        ignore: &'a IgnoreRules,
        renderer: &'a dyn TemplateRenderer,
        bindings: &'a VariableBindings,
    ) -> Self {
        Self { entries: entries.into_iter(), ignore, renderer, bindings }
    }

    fn plan(&self, source: SourceEntry) -> Result<PlannedEntry> {
        if self.ignore.is_ignored(&source.path) {
            return Ok(PlannedEntry { source, disposition: Disposition::Ignored });
        }
        let disposition = match render_target_path(&source.path, self.renderer, self.bindings)? {
            Some(target) => Disposition::Target(target),
            None => Disposition::Omitted,
        };
        Ok(PlannedEntry { source, disposition })
    }
}

impl Iterator for WalkPlan<'_> {
    type Item = Result<PlannedEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.entries.next()?;
        Some(self.plan(source))
    }
}

/// Fails if `output_dir` is already present; existing projects are never overwritten.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    if fs::symlink_metadata(output_dir).is_ok() {
        return Err(Error::TargetExistsError { path: output_dir.to_path_buf() });
    }
    Ok(())
}

/// Paths created by a materialization, relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

enum Rendered {
    Dir(PathBuf),
    File { target: PathBuf, content: Vec<u8>, mode: u32 },
}

/// Writes a template tree into a fresh output directory.
pub struct Materializer<'a> {
    renderer: &'a dyn TemplateRenderer,
    sniffer: &'a dyn ContentSniffer,
    ignore: &'a IgnoreRules,
}

impl<'a> Materializer<'a> {
    pub fn new(
        renderer: &'a dyn TemplateRenderer,
        sniffer: &'a dyn ContentSniffer,
        ignore: &'a IgnoreRules,
    ) -> Self {
        Self { renderer, sniffer, ignore }
    }

    /// Materializes `tree` into `output_dir`.
    ///
    /// All substitution happens before the first write, so a substitution failure leaves
    /// no output behind. An I/O failure while writing aborts and leaves whatever was
    /// already written; it is not rolled back.
    ///
    /// # Errors
    /// * `Error::TargetExistsError` if `output_dir` exists
    /// * `Error::SubstitutionError` if any path segment or text file fails to render
    /// * `Error::FetchError` if a source file cannot be read
    /// * `Error::MaterializationIOError` if creating or writing output fails
    pub fn materialize(
        &self,
        tree: &dyn SourceTree,
        bindings: &VariableBindings,
        output_dir: &Path,
    ) -> Result<MaterializeReport> {
        ensure_output_dir(output_dir)?;

        let plan = WalkPlan::new(tree.entries()?, self.ignore, self.renderer, bindings);
        let mut rendered = Vec::new();
        for planned in plan {
            let PlannedEntry { source, disposition } = planned?;
            match disposition {
                Disposition::Ignored => debug!("Skipping ignored {}", source.path.display()),
                Disposition::Omitted => {
                    debug!("Skipping {} as its rendered name is empty", source.path.display())
                }
                Disposition::Target(target) if source.is_dir => rendered.push(Rendered::Dir(target)),
                Disposition::Target(target) => {
                    let content = self.render_content(tree, &source, bindings)?;
                    rendered.push(Rendered::File { target, content, mode: source.mode });
                }
            }
        }

        self.write(rendered, output_dir)
    }

    fn render_content(
        &self,
        tree: &dyn SourceTree,
        source: &SourceEntry,
        bindings: &VariableBindings,
    ) -> Result<Vec<u8>> {
        let bytes = tree.read(&source.path)?;
        if !self.sniffer.is_text(&bytes) {
            debug!("Copying binary file {}", source.path.display());
            return Ok(bytes);
        }
        match std::str::from_utf8(&bytes) {
            Ok(text) => {
                let path = source.path.display().to_string();
                Ok(self.renderer.render(text, bindings, &path)?.into_bytes())
            }
            Err(_) => Ok(bytes),
        }
    }

    fn write(&self, rendered: Vec<Rendered>, output_dir: &Path) -> Result<MaterializeReport> {
        fs::create_dir_all(output_dir).map_err(write_error(output_dir))?;

        let mut report = MaterializeReport::default();
        for entry in rendered {
            match entry {
                Rendered::Dir(target) => {
                    let path = output_dir.join(&target);
                    fs::create_dir_all(&path).map_err(write_error(&path))?;
                    report.directories.push(target);
                }
                Rendered::File { target, content, mode } => {
                    let path = output_dir.join(&target);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent).map_err(write_error(parent))?;
                    }
                    fs::write(&path, content).map_err(write_error(&path))?;
                    set_mode(&path, mode).map_err(write_error(&path))?;
                    info!("create {}", target.display());
                    report.files.push(target);
                }
            }
        }
        Ok(report)
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.to_path_buf();
    move |source| Error::MaterializationIOError { path, source }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o600))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
