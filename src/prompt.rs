//! Prompt resolution for stencil templates.
//! Each declared prompt is resolved from, in decreasing priority, the caller's overrides,
//! the template's override file, or an interactive answer seeded with the caller's
//! default (falling back to the prompt's own default).

use crate::bindings::VariableBindings;
use crate::config::{Prompt, PromptSet};
use crate::error::{Error, Result};
use dialoguer::{FuzzySelect, Input, Select};
use log::debug;

/// Choice lists longer than this get a fuzzy-search selector.
const FUZZY_SELECT_THRESHOLD: usize = 10;

/// Everything an interactive prompter needs to ask one question.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    pub name: &'a str,
    pub label: &'a str,
    /// Empty means no default
    pub default: &'a str,
    pub required: bool,
    pub choices: &'a [String],
}

/// Asks the operator for a single value.
pub trait Prompter {
    /// Returns the answer to `request`.
    ///
    /// When `request.choices` is non-empty the answer must be one of them. For a required
    /// free-text prompt the implementation should re-ask rather than return empty input.
    fn ask(&self, request: &PromptRequest<'_>) -> Result<String>;
}

fn prompt_error(name: &str, reason: impl ToString) -> Error {
    Error::PromptError { name: name.to_string(), reason: reason.to_string() }
}

/// Terminal prompter built on dialoguer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }

    fn select(&self, request: &PromptRequest<'_>) -> Result<String> {
        let default = request.choices.iter().position(|c| c == request.default).unwrap_or(0);
        let selection = if request.choices.len() > FUZZY_SELECT_THRESHOLD {
            FuzzySelect::new()
                .with_prompt(request.label)
                .default(default)
                .items(request.choices)
                .interact()
        } else {
            Select::new()
                .with_prompt(request.label)
                .default(default)
                .items(request.choices)
                .interact()
        }
        .map_err(|e| prompt_error(request.name, e))?;

        Ok(request.choices[selection].clone())
    }

    fn input(&self, request: &PromptRequest<'_>) -> Result<String> {
        let required = request.required;
        let mut input = Input::<String>::new()
            .with_prompt(request.label)
            .allow_empty(!required)
            .validate_with(move |value: &String| -> std::result::Result<(), &'static str> {
                if required && value.trim().is_empty() {
                    Err("please provide a non-empty value")
                } else {
                    Ok(())
                }
            });
        if !request.default.is_empty() {
            input = input.default(request.default.to_string());
        }
        input.interact_text().map_err(|e| prompt_error(request.name, e))
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<String> {
        if request.choices.is_empty() {
            self.input(request)
        } else {
            self.select(request)
        }
    }
}

/// Non-interactive prompter that accepts every default.
///
/// Choice prompts without a default take the first choice. Required free-text prompts
/// without a default fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&self, request: &PromptRequest<'_>) -> Result<String> {
        if !request.default.is_empty() {
            return Ok(request.default.to_string());
        }
        if let Some(first) = request.choices.first() {
            return Ok(first.clone());
        }
        if request.required {
            return Err(prompt_error(request.name, "a value is required and no default is set"));
        }
        Ok(String::new())
    }
}

/// Resolves a prompt set into bindings, asking only for what no override supplies.
pub struct PromptResolver<'a> {
    prompter: &'a dyn Prompter,
}

impl<'a> PromptResolver<'a> {
    pub fn new(prompter: &'a dyn Prompter) -> Self {
        Self { prompter }
    }

    /// Resolves every prompt in `prompts`, in order.
    ///
    /// # Arguments
    /// * `prompts` - Declared prompts
    /// * `file_overrides` - Values from the template's override file
    /// * `caller_overrides` - Values supplied by the caller; always win
    /// * `caller_defaults` - Preferred defaults offered when prompting
    ///
    /// # Returns
    /// * Interactive answers layered under the override file, layered under the caller's
    ///   overrides
    ///
    /// # Errors
    /// * `Error::PromptError` if the prompter fails or returns an answer that violates the
    ///   prompt's choice set or required flag
    pub fn resolve(
        &self,
        prompts: &PromptSet,
        file_overrides: &VariableBindings,
        caller_overrides: &VariableBindings,
        caller_defaults: &VariableBindings,
    ) -> Result<VariableBindings> {
        let explicit = file_overrides.merge(caller_overrides);

        let mut answers = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            if explicit.contains(&prompt.name) {
                debug!("Prompt '{}' resolved by override.", prompt.name);
                continue;
            }
            let default = caller_defaults.get(&prompt.name).unwrap_or(prompt.default.as_str());
            let answer = self.prompter.ask(&PromptRequest {
                name: &prompt.name,
                label: &prompt.label,
                default,
                required: prompt.required,
                choices: &prompt.choices,
            })?;
            check_answer(prompt, &answer)?;
            debug!("Prompt '{}' answered interactively.", prompt.name);
            answers.push((prompt.name.clone(), answer));
        }

        Ok(answers.into_iter().collect::<VariableBindings>().merge(&explicit))
    }
}

fn check_answer(prompt: &Prompt, answer: &str) -> Result<()> {
    if !prompt.choices.is_empty() && !prompt.choices.iter().any(|c| c == answer) {
        return Err(prompt_error(
            &prompt.name,
            format!("'{answer}' is not one of: {}", prompt.choices.join(", ")),
        ));
    }
    if prompt.required && answer.trim().is_empty() {
        return Err(prompt_error(&prompt.name, "a value is required"));
    }
    Ok(())
}
