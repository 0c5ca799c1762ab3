//! Error handling for stencil.
//! Defines the error kinds surfaced by every scaffolding stage and the result alias
//! used throughout the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning a template source into a project.
///
/// Every variant is fatal for the invocation that produced it. The engine never
/// retries and never logs-and-continues; the original cause is preserved for display.
#[derive(Error, Debug)]
pub enum Error {
    /// The template source could not be reached or read.
    #[error("Failed to fetch template from '{location}': {reason}.")]
    FetchError { location: String, reason: String },

    /// A prompt-declaration or override file exists but is malformed.
    #[error("Invalid configuration file '{path}': {reason}.")]
    ConfigFormatError { path: PathBuf, reason: String },

    /// A declared or overridden variable collides with a reserved name.
    #[error("'{origin}' declares reserved variable '{name}'.")]
    ReservedNameError { origin: String, name: String },

    /// Interactive resolution of a prompt failed.
    #[error("Failed to resolve prompt '{name}': {reason}.")]
    PromptError { name: String, reason: String },

    /// The collection selection did not resolve to one of the available templates.
    #[error("Can not process the chosen element of collection '{choice}' (available: {choices}).")]
    CollectionSelectionError { choice: String, choices: String },

    /// The output directory is already present.
    #[error("Output directory '{path}' already exists.")]
    TargetExistsError { path: PathBuf },

    /// A template reference could not be resolved against the final bindings.
    #[error("Failed to substitute variables in '{path}': {reason}.")]
    SubstitutionError { path: String, reason: String },

    /// Writing the output tree failed partway.
    #[error("Failed to write '{path}': {source}.")]
    MaterializationIOError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
