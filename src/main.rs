//! Stencil's main application entry point.
//! Parses arguments, configures logging, and runs the selected scaffolding operation.

use stencil::{
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    logger::init_logger,
    prompt::DefaultsPrompter,
    Scaffolder,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Builds the scaffolder from the command-line options
/// 2. Loads the template (local directory or git clone)
/// 3. Selects a template if the source is a collection
/// 4. Resolves variables, prompting for whatever is not overridden
/// 5. Writes the output project
fn run(args: Args) -> Result<()> {
    let mut scaffolder = Scaffolder::new(args.options())?;
    if args.no_input {
        scaffolder = scaffolder.with_prompter(DefaultsPrompter);
    }

    let report = match &args.collection {
        Some(label) => scaffolder.scaffold_collection(&args.template, label, &args.output_dir)?,
        None => scaffolder.scaffold(&args.template, &args.output_dir)?,
    };

    println!(
        "Created {} file(s) in {}.",
        report.files.len(),
        args.output_dir.display()
    );
    Ok(())
}
