//! Scaffolding orchestration.
//! Ties fetching, collection detection, prompt resolution, and materialization together
//! into the two public operations: scaffold one template, or pick one from a collection.
//!
//! Each invocation moves forward through [`Stage`]s and never revisits one; any stage
//! may end the invocation in [`Stage::Failed`].

use crate::bindings::VariableBindings;
use crate::collection::is_collection;
use crate::config::{load_overrides, load_prompts, PromptSet, ReservedNames};
use crate::constants::{COLLECTION_CHOICE_VAR, DEFAULT_COLLECTION_PROMPT};
use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;
use crate::loader::load_template;
use crate::processor::{ensure_output_dir, MaterializeReport, Materializer};
use crate::prompt::{DialoguerPrompter, PromptResolver, Prompter};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::sniff::{ContentSniffer, NulByteSniffer};
use crate::tree::SourceTree;
use log::debug;
use std::path::{Component, Path, PathBuf};

/// Caller-supplied configuration for a [`Scaffolder`].
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    /// Values that always win and suppress prompting
    pub overrides: VariableBindings,
    /// Preferred defaults offered when prompting
    pub defaults: VariableBindings,
    /// Names templates may not declare
    pub reserved: Vec<String>,
    /// Glob patterns excluded from the output in addition to the built-in ones
    pub extra_ignores: Vec<String>,
    /// Directory inside the fetched source that holds the template
    pub sub_path: Option<PathBuf>,
}

/// Progress of one scaffolding invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    DetectingCollection,
    SelectingOption,
    ResolvingPrompts,
    Materializing,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::DetectingCollection => "detecting collection",
            Stage::SelectingOption => "selecting option",
            Stage::ResolvingPrompts => "resolving prompts",
            Stage::Materializing => "materializing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage) {
    debug!("Stage: {stage}");
}

fn failed(err: Error) -> Error {
    debug!("Stage: {} ({err})", Stage::Failed);
    err
}

/// Creates projects from templates.
pub struct Scaffolder {
    overrides: VariableBindings,
    defaults: VariableBindings,
    reserved: ReservedNames,
    ignore: IgnoreRules,
    prompter: Box<dyn Prompter>,
    renderer: Box<dyn TemplateRenderer>,
    sniffer: Box<dyn ContentSniffer>,
    sub_path: Option<PathBuf>,
}

impl Scaffolder {
    /// Creates a scaffolder that prompts on the terminal.
    ///
    /// # Errors
    /// * `Error::ConfigFormatError` if an extra ignore pattern is invalid
    pub fn new(options: ScaffoldOptions) -> Result<Self> {
        Ok(Self {
            ignore: IgnoreRules::new(&options.extra_ignores)?,
            reserved: ReservedNames::new(options.reserved),
            overrides: options.overrides,
            defaults: options.defaults,
            prompter: Box::new(DialoguerPrompter::new()),
            renderer: Box::new(MiniJinjaRenderer::new()),
            sniffer: Box::new(NulByteSniffer),
            sub_path: options.sub_path,
        })
    }

    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_sniffer(mut self, sniffer: impl ContentSniffer + 'static) -> Self {
        self.sniffer = Box::new(sniffer);
        self
    }

    /// Creates a project at `output_dir` from the template at `template`.
    ///
    /// If the template turns out to be a collection, the user is asked to choose one of
    /// its templates first.
    pub fn scaffold(&self, template: &str, output_dir: &Path) -> Result<MaterializeReport> {
        self.fetch(template, output_dir)
            .and_then(|tree| self.single(tree.as_ref(), output_dir))
            .map_err(failed)
    }

    /// Creates a project at `output_dir` from one template of the collection at `template`,
    /// asking with `prompt_label` which one to use.
    pub fn scaffold_collection(
        &self,
        template: &str,
        prompt_label: &str,
        output_dir: &Path,
    ) -> Result<MaterializeReport> {
        self.fetch(template, output_dir)
            .and_then(|tree| self.from_collection(tree.as_ref(), prompt_label, output_dir))
            .map_err(failed)
    }

    /// [`Scaffolder::scaffold`] for an already loaded tree.
    pub fn scaffold_tree(&self, tree: &dyn SourceTree, output_dir: &Path) -> Result<MaterializeReport> {
        self.enter_sub_path(tree)
            .and_then(|narrowed| match narrowed {
                Some(sub_tree) => self.single(sub_tree.as_ref(), output_dir),
                None => self.single(tree, output_dir),
            })
            .map_err(failed)
    }

    /// [`Scaffolder::scaffold_collection`] for an already loaded tree.
    pub fn scaffold_collection_tree(
        &self,
        tree: &dyn SourceTree,
        prompt_label: &str,
        output_dir: &Path,
    ) -> Result<MaterializeReport> {
        self.enter_sub_path(tree)
            .and_then(|narrowed| match narrowed {
                Some(sub_tree) => self.from_collection(sub_tree.as_ref(), prompt_label, output_dir),
                None => self.from_collection(tree, prompt_label, output_dir),
            })
            .map_err(failed)
    }

    fn fetch(&self, template: &str, output_dir: &Path) -> Result<Box<dyn SourceTree>> {
        ensure_output_dir(output_dir)?;
        enter(Stage::Fetching);
        let tree = load_template(template)?;
        Ok(self.enter_sub_path(tree.as_ref())?.unwrap_or(tree))
    }

    /// Narrows `tree` to the configured sub-path, one directory at a time.
    ///
    /// # Returns
    /// * `Ok(None)` if no sub-path is configured or it names the root itself
    ///
    /// # Errors
    /// * `Error::FetchError` if the sub-path does not exist or leaves the source
    fn enter_sub_path(&self, tree: &dyn SourceTree) -> Result<Option<Box<dyn SourceTree>>> {
        let Some(sub_path) = &self.sub_path else {
            return Ok(None);
        };
        let mut narrowed: Option<Box<dyn SourceTree>> = None;
        for component in sub_path.components() {
            let current: &dyn SourceTree = match &narrowed {
                Some(sub_tree) => sub_tree.as_ref(),
                None => tree,
            };
            let name = match component {
                Component::CurDir => continue,
                Component::Normal(name) => name.to_str(),
                _ => None,
            };
            let Some(name) = name else {
                return Err(Error::FetchError {
                    location: tree.location(),
                    reason: format!("'{}' is not a sub-directory of the template", sub_path.display()),
                });
            };
            narrowed = Some(current.narrow(name)?);
        }
        if let Some(sub_tree) = &narrowed {
            debug!("Using sub-path {}", sub_tree.location());
        }
        Ok(narrowed)
    }

    fn single(&self, tree: &dyn SourceTree, output_dir: &Path) -> Result<MaterializeReport> {
        enter(Stage::DetectingCollection);
        let (collection, choices) = is_collection(tree)?;
        if collection {
            let chosen = self.select(tree, DEFAULT_COLLECTION_PROMPT, choices)?;
            return self.create(chosen.as_ref(), output_dir);
        }
        self.create(tree, output_dir)
    }

    fn from_collection(
        &self,
        tree: &dyn SourceTree,
        prompt_label: &str,
        output_dir: &Path,
    ) -> Result<MaterializeReport> {
        enter(Stage::DetectingCollection);
        let (_, choices) = is_collection(tree)?;
        let chosen = self.select(tree, prompt_label, choices)?;
        self.create(chosen.as_ref(), output_dir)
    }

    /// Asks which template of a collection to use and returns the tree narrowed to it.
    ///
    /// The choice goes through the ordinary prompt layering, so an override of
    /// the collection-selection variable skips the question.
    ///
    /// # Errors
    /// * `Error::CollectionSelectionError` if there is nothing to choose from or the
    ///   resolved choice is not one of the collection's templates
    pub fn select(
        &self,
        tree: &dyn SourceTree,
        prompt_label: &str,
        choices: Vec<String>,
    ) -> Result<Box<dyn SourceTree>> {
        enter(Stage::SelectingOption);
        if choices.is_empty() {
            return Err(Error::CollectionSelectionError {
                choice: String::new(),
                choices: format!("no templates found in {}", tree.location()),
            });
        }

        let prompts = PromptSet::collection_choice(prompt_label, choices.clone());
        let file_overrides = load_overrides(tree, &self.reserved)?;
        let values = PromptResolver::new(self.prompter.as_ref()).resolve(
            &prompts,
            &file_overrides,
            &self.overrides,
            &self.defaults,
        )?;

        let choice = values.get(COLLECTION_CHOICE_VAR).unwrap_or_default();
        if !choices.iter().any(|c| c == choice) {
            return Err(Error::CollectionSelectionError {
                choice: choice.to_string(),
                choices: choices.join(", "),
            });
        }
        debug!("Using '{}' from collection {}", choice, tree.location());
        tree.narrow(choice)
    }

    /// Resolves the variables declared by `tree`.
    ///
    /// A template without a prompt file needs no variables and is never prompted for.
    pub fn resolve(&self, tree: &dyn SourceTree) -> Result<VariableBindings> {
        enter(Stage::ResolvingPrompts);
        let Some(prompts) = load_prompts(tree, &self.reserved)? else {
            return Ok(VariableBindings::new());
        };
        let file_overrides = load_overrides(tree, &self.reserved)?;
        PromptResolver::new(self.prompter.as_ref()).resolve(
            &prompts,
            &file_overrides,
            &self.overrides,
            &self.defaults,
        )
    }

    fn create(&self, tree: &dyn SourceTree, output_dir: &Path) -> Result<MaterializeReport> {
        let bindings = self.resolve(tree)?;

        enter(Stage::Materializing);
        let report = Materializer::new(self.renderer.as_ref(), self.sniffer.as_ref(), &self.ignore)
            .materialize(tree, &bindings, output_dir)?;

        enter(Stage::Done);
        Ok(report)
    }
}
