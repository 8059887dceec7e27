// Task Matrix Validation
// Applies the matrix validator to pipeline tasks using the pipeline's declared params

use crate::config::Defaults;
use crate::error::{MatrixResult, ValidationError};
use crate::parser::models::{PipelineSpec, PipelineTask};
use crate::parser::task::TaskParser;
use crate::validation::matrix::MatrixValidator;
use crate::validation::references::{ParamNameSets, ReferenceValidator, PARAMS_PREFIX};

use std::path::Path;
use tracing::debug;

impl PipelineTask {
    /// Validate this task's matrix, if any, against its own plain params
    pub fn validate_matrix(
        &self,
        defaults: &Defaults,
        names: &ParamNameSets,
        references: &dyn ReferenceValidator,
    ) -> Result<(), Vec<ValidationError>> {
        let Some(matrix) = &self.matrix else {
            return Ok(());
        };

        MatrixValidator::validate(
            matrix,
            &self.params,
            defaults,
            names,
            references,
            PARAMS_PREFIX,
        )
    }
}

impl PipelineSpec {
    /// Parse a pipeline file and validate every matrix in it
    pub fn load_validated<P: AsRef<Path>>(
        path: P,
        defaults: &Defaults,
        references: &dyn ReferenceValidator,
    ) -> MatrixResult<Self> {
        let pipeline = TaskParser::parse_file(path)?;
        pipeline.validate_matrices(defaults, references)?;
        Ok(pipeline)
    }

    /// Validate every task's matrix, reporting errors under `tasks[i]`
    pub fn validate_matrices(
        &self,
        defaults: &Defaults,
        references: &dyn ReferenceValidator,
    ) -> Result<(), Vec<ValidationError>> {
        let names = ParamNameSets::from_specs(&self.params);
        let mut errors = Vec::new();

        for (i, task) in self.tasks.iter().enumerate() {
            if let Err(task_errors) = task.validate_matrix(defaults, &names, references) {
                debug!(task = %task.name, errors = task_errors.len(), "task matrix invalid");
                errors.extend(
                    task_errors
                        .into_iter()
                        .map(|e| e.via_field_index("tasks", i)),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::{MatrixError, ValidationErrorKind};
    use crate::validation::references::ParamReferenceValidator;

    #[test]
    fn test_task_without_matrix_is_valid() {
        let task = PipelineTask {
            name: "lint".to_string(),
            ..Default::default()
        };
        assert!(task
            .validate_matrix(
                &Defaults::default(),
                &ParamNameSets::new(),
                &ParamReferenceValidator
            )
            .is_ok());
    }

    #[test]
    fn test_pipeline_errors_prefixed_by_task() {
        let yaml = r#"
params:
  - name: registry
tasks:
  - name: ok
    matrix:
      params:
        - name: image
          value: ["$(params.registry)/a", "$(params.registry)/b"]
  - name: broken
    params:
      - name: os
        value: linux
    matrix:
      params:
        - name: os
          value: [linux, mac]
        - name: tag
          value: latest
"#;
        let pipeline = TaskParser::parse_pipeline(yaml).unwrap();
        let errors = pipeline
            .validate_matrices(&Defaults::default(), &ParamReferenceValidator)
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, ValidationErrorKind::TypeMismatch);
        assert_eq!(errors[0].path(), "tasks[1].matrix.params[tag]");
        assert_eq!(errors[1].kind, ValidationErrorKind::MutualExclusionViolation);
        assert_eq!(errors[1].path(), "tasks[1].matrix[os], tasks[1].params[os]");
    }

    #[test]
    fn test_pipeline_bound_from_defaults() {
        let yaml = r#"
tasks:
  - name: wide
    matrix:
      params:
        - name: a
          value: ["1", "2", "3"]
        - name: b
          value: ["1", "2", "3"]
"#;
        let pipeline = TaskParser::parse_pipeline(yaml).unwrap();
        assert!(pipeline
            .validate_matrices(&Defaults::default(), &ParamReferenceValidator)
            .is_ok());

        let errors = pipeline
            .validate_matrices(
                &Defaults::with_max_matrix_combinations_count(8),
                &ParamReferenceValidator,
            )
            .unwrap_err();
        assert_eq!(errors[0].path(), "tasks[0].matrix");
        assert_eq!(errors[0].bounds.map(|b| b.value), Some(9));
    }

    #[test]
    fn test_load_validated() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "tasks:\n  - name: t\n    matrix:\n      params:\n        - name: os\n          value: [linux, mac]"
        )
        .unwrap();

        let pipeline = PipelineSpec::load_validated(
            file.path(),
            &Defaults::default(),
            &ParamReferenceValidator,
        )
        .unwrap();
        assert_eq!(pipeline.tasks.len(), 1);

        let err = PipelineSpec::load_validated(
            file.path(),
            &Defaults::with_max_matrix_combinations_count(1),
            &ParamReferenceValidator,
        )
        .unwrap_err();
        assert!(matches!(err, MatrixError::Validation(ref errors) if errors.len() == 1));

        let err = PipelineSpec::load_validated(
            "/no/such/file.yaml",
            &Defaults::default(),
            &ParamReferenceValidator,
        )
        .unwrap_err();
        assert!(matches!(err, MatrixError::Parse(_)));
    }
}
