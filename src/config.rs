//! Prompt declarations and override files for stencil templates.
//! Both files are TOML: `prompts.toml` holds an ordered list of `[[prompt]]` tables and
//! `.override.toml` a flat table of string values.

use crate::bindings::VariableBindings;
use crate::constants::{COLLECTION_CHOICE_VAR, OVERRIDE_FILE, PROMPT_FILE};
use crate::error::{Error, Result};
use crate::tree::SourceTree;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One requested variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Prompt {
    pub name: String,
    /// Question shown to the user
    #[serde(rename = "prompt")]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Empty means no default
    #[serde(default)]
    pub default: String,
    /// When non-empty the answer must be one of these
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Ordered prompts with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSet {
    prompts: Vec<Prompt>,
}

#[derive(Debug, Deserialize)]
struct PromptFile {
    #[serde(default, rename = "prompt")]
    prompts: Vec<Prompt>,
}

impl PromptSet {
    /// Builds a prompt set, rejecting duplicate names.
    ///
    /// # Errors
    /// * `Error::ConfigFormatError` naming `origin` if two prompts share a name
    pub fn new(prompts: Vec<Prompt>, origin: &Path) -> Result<Self> {
        let mut seen = IndexSet::new();
        for prompt in &prompts {
            if !seen.insert(prompt.name.as_str()) {
                return Err(Error::ConfigFormatError {
                    path: origin.to_path_buf(),
                    reason: format!("prompt '{}' is declared more than once", prompt.name),
                });
            }
        }
        Ok(Self { prompts })
    }

    /// The synthetic single-prompt set asking which template of a collection to use.
    ///
    /// This set bypasses reserved-name validation: its only prompt is the engine's own
    /// selection variable.
    pub fn collection_choice(label: &str, choices: Vec<String>) -> Self {
        Self {
            prompts: vec![Prompt {
                name: COLLECTION_CHOICE_VAR.to_string(),
                label: label.to_string(),
                required: true,
                default: String::new(),
                choices,
            }],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prompt> {
        self.prompts.iter()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl<'a> IntoIterator for &'a PromptSet {
    type Item = &'a Prompt;
    type IntoIter = std::slice::Iter<'a, Prompt>;

    fn into_iter(self) -> Self::IntoIter {
        self.prompts.iter()
    }
}

/// Variable names that neither a prompt file nor an override file may declare.
///
/// The collection-selection variable is never part of this set, so the engine's own
/// selection prompt cannot be rejected by a caller's list.
#[derive(Debug, Clone, Default)]
pub struct ReservedNames(IndexSet<String>);

impl ReservedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name| {
                if name == COLLECTION_CHOICE_VAR {
                    debug!("Ignoring reserved name '{}', it is used internally.", name);
                    false
                } else {
                    true
                }
            })
            .collect();
        Self(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Fails on the first name in `names` that is reserved.
    pub fn check<'a>(&self, origin: &Path, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        match names.into_iter().find(|name| self.contains(name)) {
            Some(name) => Err(Error::ReservedNameError {
                origin: origin.display().to_string(),
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses the contents of a prompt-declaration file.
///
/// # Arguments
/// * `content` - Raw TOML text
/// * `path` - Location used in error messages
/// * `reserved` - Names the file may not declare
///
/// # Errors
/// * `Error::ConfigFormatError` if the TOML does not describe a list of prompts
/// * `Error::ReservedNameError` if any prompt uses a reserved name
pub fn parse_prompts(content: &str, path: &Path, reserved: &ReservedNames) -> Result<PromptSet> {
    let file: PromptFile = toml::from_str(content).map_err(|e| Error::ConfigFormatError {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })?;
    let prompts = PromptSet::new(file.prompts, path)?;
    reserved.check(path, prompts.iter().map(|p| p.name.as_str()))?;
    Ok(prompts)
}

/// Parses the contents of an override file into bindings.
///
/// # Errors
/// * `Error::ConfigFormatError` if the TOML is not a flat string-to-string table
/// * `Error::ReservedNameError` if any key is reserved
pub fn parse_overrides(
    content: &str,
    path: &Path,
    reserved: &ReservedNames,
) -> Result<VariableBindings> {
    let values: IndexMap<String, String> =
        toml::from_str(content).map_err(|e| Error::ConfigFormatError {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
    reserved.check(path, values.keys().map(String::as_str))?;
    Ok(values.into())
}

fn read_text(tree: &dyn SourceTree, name: &str) -> Result<(PathBuf, String)> {
    let path = PathBuf::from(name);
    let bytes = tree.read(&path)?;
    let content = String::from_utf8(bytes).map_err(|e| Error::ConfigFormatError {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok((path, content))
}

/// Loads the top-level prompt-declaration file, if the template has one.
pub fn load_prompts(tree: &dyn SourceTree, reserved: &ReservedNames) -> Result<Option<PromptSet>> {
    if !tree.contains_file(Path::new(PROMPT_FILE)) {
        debug!("No {} in {}", PROMPT_FILE, tree.location());
        return Ok(None);
    }
    debug!("Loading prompts from {}/{}", tree.location(), PROMPT_FILE);
    let (path, content) = read_text(tree, PROMPT_FILE)?;
    parse_prompts(&content, &path, reserved).map(Some)
}

/// Loads the top-level override file; a missing file yields empty bindings.
pub fn load_overrides(tree: &dyn SourceTree, reserved: &ReservedNames) -> Result<VariableBindings> {
    if !tree.contains_file(Path::new(OVERRIDE_FILE)) {
        return Ok(VariableBindings::new());
    }
    debug!("Loading overrides from {}/{}", tree.location(), OVERRIDE_FILE);
    let (path, content) = read_text(tree, OVERRIDE_FILE)?;
    parse_overrides(&content, &path, reserved)
}
