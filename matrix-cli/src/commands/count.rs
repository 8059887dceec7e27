use super::exit_with_parse_error;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use matrix_service::TaskParser;

/// Print how many combinations each task's matrix requests
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Path to the pipeline YAML file
    pub pipeline: PathBuf,
}

pub fn execute(args: CountArgs) -> Result<()> {
    let pipeline = match TaskParser::parse_file(&args.pipeline) {
        Ok(p) => p,
        Err(e) => exit_with_parse_error(&e),
    };

    for task in &pipeline.tasks {
        let count = task
            .matrix
            .as_ref()
            .map(|m| m.count_combinations())
            .unwrap_or(0);
        println!("{}: {}", task.name, count);
    }

    Ok(())
}
