// Matrix Combination Counting
// Estimates how many child executions a matrix requests, without expanding it

use crate::parser::models::Matrix;

use tracing::debug;

impl Matrix {
    /// Number of combinations this matrix requests: the params product plus
    /// the include-derived count. Used for the bound check only.
    pub fn count_combinations(&self) -> usize {
        let from_params = self.count_generated_combinations_from_params();
        let from_include = self.count_new_combinations_from_include();
        let count = from_params.saturating_add(from_include);

        debug!(from_params, from_include, count, "counted matrix combinations");
        count
    }

    /// Product of the array lengths, or 0 without params
    fn count_generated_combinations_from_params(&self) -> usize {
        if !self.has_params() {
            return 0;
        }
        self.params
            .iter()
            .fold(1usize, |count, param| {
                count.saturating_mul(param.value.as_array().len())
            })
    }

    /// Combinations contributed by include entries.
    ///
    /// Without params every entry counts once. Otherwise each entry is scanned
    /// param by param: a value already present in the matching matrix param
    /// ends the scan for that entry, a value that is absent counts one and the
    /// scan continues, so one entry can count more than once.
    fn count_new_combinations_from_include(&self) -> usize {
        if !self.has_include() {
            return 0;
        }
        if !self.has_params() {
            return self.include.len();
        }

        let matrix_values = self.params.extract_param_map_arr_vals();
        let mut count = 0usize;

        for include in &self.include {
            for param in include.params.iter() {
                let Some(values) = matrix_values.get(&param.name) else {
                    continue;
                };
                let value = param.value.as_str().unwrap_or_default();
                if values.iter().any(|v| v == value) {
                    break;
                }
                count += 1;
            }
        }

        count
    }
}
