// Matrix Fan-Out Module
// Cartesian expansion of matrix params and pre-flight combination counting

pub mod combination;
pub mod count;
pub mod fanout;

pub use combination::{Combination, Combinations};

use crate::parser::models::{Matrix, Params};

impl Matrix {
    pub fn new(params: impl Into<Params>) -> Self {
        Self {
            params: params.into(),
            include: Vec::new(),
        }
    }

    /// True if the matrix declares at least one fan-out parameter
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// True if the matrix declares at least one include entry
    pub fn has_include(&self) -> bool {
        !self.include.is_empty()
    }

    /// Matrix params followed by every include entry's params, in declaration order
    pub fn get_all_params(&self) -> Params {
        let mut params = Params::new();
        params.extend(self.params.iter().cloned());
        for include in &self.include {
            params.extend(include.params.iter().cloned());
        }
        params
    }
}
