// Validation Module
// Matrix checks, variable reference checks, and task-level entry points

pub mod matrix;
pub mod references;
pub mod task;

pub use matrix::MatrixValidator;
pub use references::{ParamNameSets, ParamReferenceValidator, ReferenceValidator, PARAMS_PREFIX};
