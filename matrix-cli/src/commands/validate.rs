use super::{exit_with_parse_error, exit_with_validation_errors};
use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use matrix_service::{Defaults, ParamReferenceValidator, TaskParser};

/// Validate every matrix in a pipeline YAML file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the pipeline YAML file
    pub pipeline: PathBuf,
}

pub fn execute(args: ValidateArgs, defaults: &Defaults) -> Result<()> {
    let pipeline_path = &args.pipeline;

    if !pipeline_path.exists() {
        color_eyre::eyre::bail!("Pipeline file not found: {}", pipeline_path.display());
    }

    output::status("Validating", &format!("{}", pipeline_path.display()));

    let pipeline = match TaskParser::parse_file(pipeline_path) {
        Ok(p) => p,
        Err(e) => exit_with_parse_error(&e),
    };

    output::check("YAML syntax valid");

    let matrix_tasks = pipeline.tasks.iter().filter(|t| t.matrix.is_some()).count();
    output::check(&format!(
        "Structure: {} tasks, {} with a matrix",
        pipeline.tasks.len(),
        matrix_tasks
    ));

    if let Err(errors) = pipeline.validate_matrices(defaults, &ParamReferenceValidator) {
        exit_with_validation_errors(&errors);
    }

    output::check(&format!(
        "Matrix validation passed (max {} combinations)",
        defaults.max_matrix_combinations_count
    ));

    println!();
    output::success("Pipeline is valid");

    Ok(())
}
