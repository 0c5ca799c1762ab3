//! Common constants used throughout stencil.

/// Name of the prompt-declaration file at the root of a template.
pub const PROMPT_FILE: &str = "prompts.toml";

/// Name of the per-template override file.
pub const OVERRIDE_FILE: &str = ".override.toml";

/// Version-control and package-manager directories that are never copied.
pub const IGNORED_DIRECTORIES: [&str; 4] = [".git", ".hg", ".svn", "node_modules"];

/// Variable carrying the user's choice of template inside a collection.
pub const COLLECTION_CHOICE_VAR: &str = "__ScaffoldUrl";

/// Label of the selection prompt when a plain scaffold meets a collection.
pub const DEFAULT_COLLECTION_PROMPT: &str = "Choose a project template";
