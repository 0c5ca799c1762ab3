#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use stencil::error::{Error, Result};
use stencil::prompt::{PromptRequest, Prompter};

/// A prompt as seen by the prompter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asked {
    pub name: String,
    pub label: String,
    pub default: String,
    pub choices: Vec<String>,
}

/// Replies with queued answers, falling back to the offered default, and records
/// every request. Clones share the same queue and log.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    answers: Rc<RefCell<VecDeque<String>>>,
    asked: Rc<RefCell<Vec<Asked>>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Rc::new(RefCell::new(answers.iter().map(|a| a.to_string()).collect())),
            asked: Rc::default(),
        }
    }

    pub fn asked(&self) -> Vec<Asked> {
        self.asked.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<String> {
        self.asked.borrow_mut().push(Asked {
            name: request.name.to_string(),
            label: request.label.to_string(),
            default: request.default.to_string(),
            choices: request.choices.to_vec(),
        });
        Ok(self
            .answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| request.default.to_string()))
    }
}

/// Fails every request; for asserting that nothing is prompted.
pub struct RefusingPrompter;

impl Prompter for RefusingPrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<String> {
        Err(Error::PromptError {
            name: request.name.to_string(),
            reason: "unexpected prompt".to_string(),
        })
    }
}

/// Writes `files` (relative path, content) below `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// A single-prompt declaration file.
pub fn prompt_file(name: &str, default: &str) -> String {
    format!("[[prompt]]\nname = \"{name}\"\nprompt = \"Value for {name}\"\ndefault = \"{default}\"\n")
}

/// Relative paths of every file below `root`, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}
