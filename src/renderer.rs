//! Variable substitution for file contents and path segments.
//! Uses MiniJinja with strict undefined handling: a reference to a variable that is not
//! bound is an error, never an empty string.

use crate::bindings::VariableBindings;
use crate::error::{Error, Result};
use cruet::Inflector;
use minijinja::{Environment, UndefinedBehavior};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders `template` against `bindings`.
    ///
    /// # Arguments
    /// * `template` - Template text (file content or a single path segment)
    /// * `bindings` - Resolved variables
    /// * `path` - Path being processed, reported on failure
    ///
    /// # Errors
    /// * `Error::SubstitutionError` carrying `path` if the template does not parse or
    ///   references an unbound variable
    fn render(&self, template: &str, bindings: &VariableBindings, path: &str) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer with strict undefined handling and the case-conversion filters.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_filter("snake_case", |value: String| value.to_snake_case());
        env.add_filter("camel_case", |value: String| value.to_camel_case());
        env.add_filter("pascal_case", |value: String| value.to_pascal_case());
        env.add_filter("kebab_case", |value: String| value.to_kebab_case());
        env.add_filter("screaming_snake_case", |value: String| value.to_screaming_snake_case());
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

/// Whether `text` contains anything MiniJinja would interpret.
pub fn has_template_syntax(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, bindings: &VariableBindings, path: &str) -> Result<String> {
        if !has_template_syntax(template) {
            return Ok(template.to_string());
        }
        self.env.render_str(template, bindings).map_err(|e| Error::SubstitutionError {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
