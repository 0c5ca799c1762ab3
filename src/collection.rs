//! Collection detection.
//! A source is a collection when it has no top-level prompt file and at least one
//! immediate subdirectory has one. Detection looks exactly one level deep.

use crate::constants::PROMPT_FILE;
use crate::error::Result;
use crate::tree::SourceTree;
use log::debug;
use std::path::Path;

/// Whether `tree` is a collection, and the names of its templates in listing order.
///
/// A single template always wins: if the root declares prompts the result is
/// `(false, [])` whatever the subdirectories contain. A source without any prompt file
/// also yields `(false, [])`.
pub fn is_collection(tree: &dyn SourceTree) -> Result<(bool, Vec<String>)> {
    if tree.contains_file(Path::new(PROMPT_FILE)) {
        return Ok((false, Vec::new()));
    }

    let choices: Vec<String> = tree
        .children()?
        .into_iter()
        .filter(|name| tree.contains_file(&Path::new(name).join(PROMPT_FILE)))
        .collect();

    debug!("{} has {} collection template(s).", tree.location(), choices.len());
    Ok((!choices.is_empty(), choices))
}
