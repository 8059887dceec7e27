pub mod count;
pub mod expand;
pub mod validate;

use crate::output;

use matrix_service::{ParseError, ValidationError};

/// Print a parse error with its suggestion, then exit
pub(crate) fn exit_with_parse_error(err: &ParseError) -> ! {
    output::error(&format!("Parse error: {}", err.message));
    if err.line > 0 {
        output::dim(&format!("  --> line {}:{}", err.line, err.column));
    }
    if let Some(suggestion) = &err.suggestion {
        output::info(&format!("  Suggestion: {}", suggestion));
    }
    std::process::exit(1);
}

/// Print every validation error, then exit
pub(crate) fn exit_with_validation_errors(errors: &[ValidationError]) -> ! {
    output::error(&format!("{} validation error(s):", errors.len()));
    for error in errors {
        output::error(&format!("  - [{}] {}", error.path(), error.message));
        if let Some(details) = &error.details {
            output::dim(&format!("      {}", details));
        }
    }
    std::process::exit(1);
}
