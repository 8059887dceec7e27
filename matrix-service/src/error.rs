// Matrix Error Types
// Field-level validation findings plus the operational errors around them

use crate::config::ConfigError;
use crate::parser::error::ParseError;

use std::fmt;
use thiserror::Error;

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Parameter value has the wrong type for the list it appears in
    TypeMismatch,
    /// Parameter name repeated within one list
    DuplicateParameter,
    /// Combination count exceeds the configured maximum
    OutOfBounds,
    /// Parameter supplied both in the matrix and in the plain params
    MutualExclusionViolation,
    /// Malformed or undeclared variable reference
    ReferenceError,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationErrorKind::TypeMismatch => "type mismatch",
            ValidationErrorKind::DuplicateParameter => "duplicate parameter",
            ValidationErrorKind::OutOfBounds => "out of bounds",
            ValidationErrorKind::MutualExclusionViolation => "mutual exclusion violation",
            ValidationErrorKind::ReferenceError => "reference error",
        };
        f.write_str(name)
    }
}

/// Allowed range for an out-of-bounds value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub value: usize,
    pub min: usize,
    pub max: usize,
}

/// A single validation finding located by one or more field paths.
///
/// Paths are built from the inside out: checks produce an error relative to
/// the element they inspect, and callers prefix it with `via_*` as the error
/// travels up, e.g. `value[2]` becomes `matrix.params[os].value[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub paths: Vec<String>,
    pub details: Option<String>,
    pub bounds: Option<Bounds>,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            kind,
            message: message.into(),
            paths: vec![path],
            details: None,
            bounds: None,
        }
    }

    pub fn type_mismatch(value: impl fmt::Display, path: impl Into<String>) -> Self {
        Self::new(
            ValidationErrorKind::TypeMismatch,
            format!("invalid value: {}", value),
            path,
        )
    }

    pub fn duplicate_parameter(name: &str, path: impl Into<String>) -> Self {
        Self::new(
            ValidationErrorKind::DuplicateParameter,
            format!(
                "parameter names must be unique, the parameter \"{}\" is also defined at",
                name
            ),
            path,
        )
    }

    pub fn out_of_bounds(value: usize, min: usize, max: usize, path: impl Into<String>) -> Self {
        let mut err = Self::new(
            ValidationErrorKind::OutOfBounds,
            format!("expected {} <= {} <= {}", min, value, max),
            path,
        );
        err.bounds = Some(Bounds { value, min, max });
        err
    }

    /// A value was supplied in more than one mutually exclusive place
    pub fn multiple_one_of<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ValidationErrorKind::MutualExclusionViolation,
            message: "expected exactly one, got both".to_string(),
            paths: paths.into_iter().map(Into::into).collect(),
            details: None,
            bounds: None,
        }
    }

    pub fn reference(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::ReferenceError, message, path)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prefix every path with a field name
    pub fn via_field(mut self, field: &str) -> Self {
        for path in &mut self.paths {
            *path = join_path(field, path);
        }
        self
    }

    /// Prefix every path with a `[key]` accessor
    pub fn via_key(self, key: &str) -> Self {
        self.via_field(&format!("[{}]", key))
    }

    /// Prefix every path with an `[index]` accessor
    pub fn via_index(self, index: usize) -> Self {
        self.via_field(&format!("[{}]", index))
    }

    /// Prefix every path with `field[key]`
    pub fn via_field_key(self, field: &str, key: &str) -> Self {
        self.via_key(key).via_field(field)
    }

    /// Prefix every path with `field[index]`
    pub fn via_field_index(self, field: &str, index: usize) -> Self {
        self.via_index(index).via_field(field)
    }

    /// All paths joined for display
    pub fn path(&self) -> String {
        self.paths.join(", ")
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    if path.starts_with('[') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}.{}", prefix, path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        let path = self.path();
        if !path.is_empty() {
            write!(f, ": {}", path)?;
        }
        if let Some(details) = &self.details {
            write!(f, "\n{}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors surfaced by the library's fallible entry points
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("matrix validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for MatrixError {
    fn from(errors: Vec<ValidationError>) -> Self {
        MatrixError::Validation(errors)
    }
}

pub type MatrixResult<T> = Result<T, MatrixError>;
