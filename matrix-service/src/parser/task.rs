// Task Definition Parser
// Loads pipeline and task documents carrying matrix definitions from YAML

use crate::parser::error::{ParseError, ParseErrorKind, ParseResult};
use crate::parser::models::{PipelineSpec, PipelineTask};

use std::fs;
use std::path::Path;

/// YAML parser for pipeline and task documents
pub struct TaskParser;

impl TaskParser {
    /// Parse a pipeline document from a YAML string
    pub fn parse_pipeline(content: &str) -> ParseResult<PipelineSpec> {
        serde_yaml::from_str(content).map_err(|e| ParseError::from_yaml_error(&e, content))
    }

    /// Parse a single task from a YAML string
    pub fn parse_task(content: &str) -> ParseResult<PipelineTask> {
        serde_yaml::from_str(content).map_err(|e| ParseError::from_yaml_error(&e, content))
    }

    /// Parse a pipeline document from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<PipelineSpec> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ParseError::new(format!("failed to read {}: {}", path.display(), e), 0, 0)
                .with_kind(ParseErrorKind::IoError)
        })?;

        Self::parse_pipeline(&content)
    }
}
