// Matrix Validator
// Pre-flight checks that must pass before a matrix is fanned out

use crate::config::Defaults;
use crate::error::ValidationError;
use crate::parser::models::{Matrix, Param, ParamType};
use crate::validation::references::{ParamNameSets, ReferenceValidator};

use tracing::{debug, warn};

/// Validator for matrix definitions.
///
/// Every check appends to a shared error list and never stops early, so one
/// pass reports every problem in the matrix.
pub struct MatrixValidator;

impl MatrixValidator {
    /// Run every matrix check against a task's matrix and its plain params
    pub fn validate(
        matrix: &Matrix,
        plain_params: &[Param],
        defaults: &Defaults,
        names: &ParamNameSets,
        references: &dyn ReferenceValidator,
        prefix: &str,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        Self::validate_params(matrix, &mut errors);
        Self::validate_combinations_count(matrix, defaults, &mut errors);
        Self::validate_parameter_in_one_of_matrix_or_params(matrix, plain_params, &mut errors);
        Self::validate_references(matrix, prefix, names, references, &mut errors);

        debug!(errors = errors.len(), "validated matrix");

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Matrix params must be arrays and include params strings, with names
    /// unique within each list
    pub fn validate_params(matrix: &Matrix, errors: &mut Vec<ValidationError>) {
        for (i, include) in matrix.include.iter().enumerate() {
            let field = format!("matrix.include[{}].params", i);

            errors.extend(
                include
                    .params
                    .duplicate_parameter_errors()
                    .into_iter()
                    .map(|e| e.via_field(&field)),
            );

            for param in include.params.iter() {
                let param_type = param.value.param_type();
                if param_type != ParamType::String {
                    errors.push(
                        ValidationError::type_mismatch(
                            format!(
                                "parameters of type string only are allowed, but got param type {}",
                                param_type
                            ),
                            "",
                        )
                        .via_field_key(&field, &param.name),
                    );
                }
            }
        }

        errors.extend(
            matrix
                .params
                .duplicate_parameter_errors()
                .into_iter()
                .map(|e| e.via_field("matrix.params")),
        );

        for param in matrix.params.iter() {
            let param_type = param.value.param_type();
            if param_type != ParamType::Array {
                errors.push(
                    ValidationError::type_mismatch(
                        format!(
                            "parameters of type array only are allowed, but got param type {}",
                            param_type
                        ),
                        "",
                    )
                    .via_field_key("matrix.params", &param.name),
                );
            }
        }
    }

    /// The combination count must not exceed the configured maximum
    pub fn validate_combinations_count(
        matrix: &Matrix,
        defaults: &Defaults,
        errors: &mut Vec<ValidationError>,
    ) {
        let count = matrix.count_combinations();
        let max = defaults.max_matrix_combinations_count;

        if count > max {
            warn!(count, max, "matrix exceeds maximum combinations");
            errors.push(ValidationError::out_of_bounds(count, 0, max, "matrix"));
        }
    }

    /// A parameter may be supplied through the matrix or the plain params, not both
    pub fn validate_parameter_in_one_of_matrix_or_params(
        matrix: &Matrix,
        plain_params: &[Param],
        errors: &mut Vec<ValidationError>,
    ) {
        let matrix_names = matrix.get_all_params().extract_names();

        for param in plain_params {
            if matrix_names.contains(&param.name) {
                errors.push(ValidationError::multiple_one_of([
                    format!("matrix[{}]", param.name),
                    format!("params[{}]", param.name),
                ]));
            }
        }
    }

    /// Delegate every matrix value to the reference validator, locating its
    /// findings at the value they came from
    pub fn validate_references(
        matrix: &Matrix,
        prefix: &str,
        names: &ParamNameSets,
        references: &dyn ReferenceValidator,
        errors: &mut Vec<ValidationError>,
    ) {
        for (i, include) in matrix.include.iter().enumerate() {
            let field = format!("matrix.include[{}].params", i);
            for (idx, param) in include.params.iter().enumerate() {
                let value = param.value.as_str().unwrap_or_default();
                errors.extend(
                    references
                        .validate_string_variable(value, prefix, names)
                        .into_iter()
                        .map(|e| e.via_field_index(&field, idx)),
                );
            }
        }

        for param in matrix.params.iter() {
            for (idx, element) in param.value.as_array().iter().enumerate() {
                errors.extend(
                    references
                        .validate_array_variable(element, prefix, names)
                        .into_iter()
                        .map(|e| {
                            e.via_field_index("value", idx)
                                .via_field_key("matrix.params", &param.name)
                        }),
                );
            }
        }
    }
}
