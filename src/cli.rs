//! Command-line interface implementation for stencil.
//! Provides argument parsing and help text formatting using clap.

use crate::bindings::VariableBindings;
use crate::scaffold::ScaffoldOptions;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for stencil.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stencil: create projects from templates and template collections", long_about = None)]
pub struct Args {
    /// Path to the template directory or git repository URL
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Directory where the generated project will be created; must not exist
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Set a variable without prompting for it
    #[arg(short = 'o', long = "override", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Offer a default value when prompting for a variable
    #[arg(short = 'd', long = "default", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub defaults: Vec<(String, String)>,

    /// Variable name templates are not allowed to declare
    #[arg(long, value_name = "NAME")]
    pub reserved: Vec<String>,

    /// Directory inside the template source to use as the template
    #[arg(long = "sub-path", value_name = "PATH")]
    pub sub_path: Option<PathBuf>,

    /// Extra glob pattern to exclude from the output
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignores: Vec<String>,

    /// Treat the template as a collection, asking with the given label which one to use
    #[arg(long, value_name = "LABEL", num_args = 0..=1, default_missing_value = crate::constants::DEFAULT_COLLECTION_PROMPT)]
    pub collection: Option<String>,

    /// Never prompt; accept defaults and fail on required values without one
    #[arg(long)]
    pub no_input: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses `KEY=VALUE`; the value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

impl Args {
    /// Scaffolding options described by these arguments.
    pub fn options(&self) -> ScaffoldOptions {
        ScaffoldOptions {
            overrides: self.overrides.iter().cloned().collect::<VariableBindings>(),
            defaults: self.defaults.iter().cloned().collect::<VariableBindings>(),
            reserved: self.reserved.clone(),
            extra_ignores: self.ignores.clone(),
            sub_path: self.sub_path.clone(),
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing, after printing help
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                // Printing help can only fail if stdout is gone; exit 1 either way.
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
