// Parser module for task definitions
// Parameter model, matrix types, and YAML loading for pipeline documents

pub mod error;
pub mod models;
pub mod task;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use models::*;
pub use task::TaskParser;
