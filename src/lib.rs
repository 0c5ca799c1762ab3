//! Stencil turns a template directory or git repository into a ready-to-use project,
//! substituting prompted or supplied variables into file contents and file names.
//! A template source may also be a collection of templates, one of which is chosen
//! before anything is generated.

/// Resolved template variables
pub mod bindings;

/// Command-line interface
pub mod cli;

/// Collection detection
pub mod collection;

/// Prompt declarations, override files, and reserved names
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling
pub mod error;

/// Always-ignored and caller-ignored paths
pub mod ignore;

/// Local and git template loading
pub mod loader;

/// Logger configuration for the binary
pub mod logger;

/// Walk planning and output materialization
pub mod processor;

/// Interactive and non-interactive prompt resolution
pub mod prompt;

/// Variable substitution
pub mod renderer;

/// Orchestration of the scaffolding operations
pub mod scaffold;

/// Text/binary detection
pub mod sniff;

/// Read-only template trees
pub mod tree;

pub use bindings::VariableBindings;
pub use error::{Error, Result};
pub use scaffold::{ScaffoldOptions, Scaffolder, Stage};
