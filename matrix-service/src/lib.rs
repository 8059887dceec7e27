// Matrix Service Library
// Fan-out of matrix parameters into concrete combinations, with pre-flight validation

pub mod config;
pub mod error;
pub mod matrix;
pub mod parser;
pub mod validation;

// Re-export commonly used types
pub use error::{Bounds, MatrixError, MatrixResult, ValidationError, ValidationErrorKind};

// Re-export config types
pub use config::{ConfigError, Defaults, DEFAULT_MAX_MATRIX_COMBINATIONS_COUNT};

// Re-export model and parser types
pub use parser::{
    IncludeParams, IncludeParamsList, Matrix, Param, ParamSpec, ParamType, ParamValue, Params,
    ParseError, ParseErrorKind, ParseResult, PipelineSpec, PipelineTask, TaskParser,
};

// Re-export fan-out types
pub use matrix::{Combination, Combinations};

// Re-export validation types
pub use validation::{
    MatrixValidator, ParamNameSets, ParamReferenceValidator, ReferenceValidator, PARAMS_PREFIX,
};
