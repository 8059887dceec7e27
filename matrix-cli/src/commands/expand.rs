use super::{exit_with_parse_error, exit_with_validation_errors};
use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use matrix_service::{Defaults, MatrixError, ParamReferenceValidator, Params, PipelineSpec};

/// Validate, then print every combination each task fans out to
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Path to the pipeline YAML file
    pub pipeline: PathBuf,

    /// Only expand the named task
    #[arg(long, value_name = "NAME")]
    pub task: Option<String>,

    /// Print combinations as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ExpandArgs, defaults: &Defaults) -> Result<()> {
    // Validation includes the bound check, so nothing is expanded past the limit
    let pipeline =
        match PipelineSpec::load_validated(&args.pipeline, defaults, &ParamReferenceValidator) {
            Ok(p) => p,
            Err(MatrixError::Parse(e)) => exit_with_parse_error(&e),
            Err(MatrixError::Validation(errors)) => exit_with_validation_errors(&errors),
            Err(e) => return Err(e.into()),
        };

    let tasks: Vec<_> = pipeline
        .tasks
        .iter()
        .filter(|t| args.task.as_ref().map_or(true, |name| &t.name == name))
        .collect();

    if let Some(name) = &args.task {
        if tasks.is_empty() {
            color_eyre::eyre::bail!("Task not found: {}", name);
        }
    }

    let expanded: Vec<(&str, Vec<Params>)> = tasks
        .iter()
        .map(|t| {
            let combinations = t.matrix.as_ref().map(|m| m.fan_out()).unwrap_or_default();
            (t.name.as_str(), combinations)
        })
        .collect();

    if args.json {
        // One entry per task in pipeline order; task names are not required to be unique
        let document = expanded
            .iter()
            .map(|(name, combinations)| {
                let mut entry = serde_json::Map::new();
                entry.insert("task".to_string(), serde_json::Value::from(*name));
                entry.insert(
                    "combinations".to_string(),
                    serde_json::to_value(combinations)?,
                );
                Ok(serde_json::Value::Object(entry))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    for (name, combinations) in &expanded {
        output::task_header(name, combinations.len());
        for (index, params) in combinations.iter().enumerate() {
            let assignments: Vec<String> = params
                .iter()
                .map(|p| format!("{}={}", p.name, p.value.as_str().unwrap_or_default()))
                .collect();
            println!("{}[{}] {}", name, index, assignments.join(" "));
        }
    }

    Ok(())
}
