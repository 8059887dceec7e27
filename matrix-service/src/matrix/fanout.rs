// Matrix Fan-Out
// Expands matrix params into one flat param list per combination

use crate::matrix::combination::{self, Combination, Combinations};
use crate::parser::models::{Matrix, Param, Params};

use tracing::debug;

impl Matrix {
    /// Expand `params` into their cartesian product.
    ///
    /// Only `params` are expanded; `include` entries are never consulted here.
    /// Parameters declared later vary slower: with `os: [linux, mac]` followed
    /// by `version: [1, 2]` the result is
    /// `linux/1, mac/1, linux/2, mac/2`. Any empty array yields no
    /// combinations at all. The bound check must run before calling this on
    /// untrusted input.
    pub fn fan_out(&self) -> Vec<Params> {
        let combinations = self.combinations();
        debug!(
            params = self.params.len(),
            combinations = combinations.len(),
            "expanded matrix"
        );
        combination::to_params(&combinations)
    }

    /// The combinations behind [`Matrix::fan_out`], before flattening
    pub fn combinations(&self) -> Combinations {
        // None until the first param is seen, so an empty first array stays empty
        let mut combinations: Option<Combinations> = None;

        for param in self.params.iter() {
            combinations = Some(match combinations {
                None => initialize_combinations(param),
                Some(existing) => distribute(&existing, param),
            });
        }

        combinations.unwrap_or_default()
    }
}

/// One singleton combination per value of the first param
fn initialize_combinations(param: &Param) -> Combinations {
    param
        .value
        .as_array()
        .iter()
        .map(|value| Combination::new().extended(&param.name, value))
        .collect()
}

/// Extend every existing combination with each value of `param`; the new
/// param's values form the outer blocks
fn distribute(existing: &[Combination], param: &Param) -> Combinations {
    let values = param.value.as_array();
    let mut expanded = Vec::with_capacity(existing.len().saturating_mul(values.len()));

    for value in values {
        for combination in existing {
            expanded.push(combination.extended(&param.name, value));
        }
    }

    expanded
}
