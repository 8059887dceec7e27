// Variable Reference Validation
// Checks $(params.*) references embedded in matrix values against declared params

use crate::error::ValidationError;
use crate::parser::models::{ParamSpec, ParamType};

use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Reference prefix for pipeline parameters
pub const PARAMS_PREFIX: &str = "params";

/// Names of declared parameters, grouped by type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamNameSets {
    pub strings: BTreeSet<String>,
    pub arrays: BTreeSet<String>,
    /// Object param names and their declared keys
    pub objects: BTreeMap<String, BTreeSet<String>>,
}

impl ParamNameSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group declared params by type
    pub fn from_specs(specs: &[ParamSpec]) -> Self {
        let mut names = Self::new();
        for spec in specs {
            match spec.param_type {
                ParamType::String => {
                    names.strings.insert(spec.name.clone());
                }
                ParamType::Array => {
                    names.arrays.insert(spec.name.clone());
                }
                ParamType::Object => {
                    names
                        .objects
                        .insert(spec.name.clone(), spec.properties.keys().cloned().collect());
                }
            }
        }
        names
    }

    pub fn with_string(mut self, name: impl Into<String>) -> Self {
        self.strings.insert(name.into());
        self
    }

    pub fn with_array(mut self, name: impl Into<String>) -> Self {
        self.arrays.insert(name.into());
        self
    }

    pub fn with_object<I, S>(mut self, name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects
            .insert(name.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strings.contains(name) || self.arrays.contains(name) || self.objects.contains_key(name)
    }
}

/// Validates variable references inside parameter values.
///
/// Returned errors are relative to the value being checked; callers prefix
/// them with the field path of that value.
pub trait ReferenceValidator {
    /// Check a value that is substituted as a single string
    fn validate_string_variable(
        &self,
        value: &str,
        prefix: &str,
        names: &ParamNameSets,
    ) -> Vec<ValidationError>;

    /// Check one element of an array value
    fn validate_array_variable(
        &self,
        value: &str,
        prefix: &str,
        names: &ParamNameSets,
    ) -> Vec<ValidationError>;
}

/// Default validator for `$(params.<name>)` style references
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamReferenceValidator;

/// How a reference addresses its parameter
#[derive(Debug, Clone, PartialEq, Eq)]
enum Accessor {
    /// `$(params.name)`
    Whole,
    /// `$(params.name[*])`
    Star,
    /// `$(params.name[0])`
    Index,
    /// `$(params.name.key)`
    Key(String),
    /// Anything else after the name
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    /// Full text between `$(` and `)`
    expression: String,
    name: String,
    accessor: Accessor,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    String,
    ArrayElement,
}

impl ParamReferenceValidator {
    fn check(
        &self,
        value: &str,
        prefix: &str,
        names: &ParamNameSets,
        context: Context,
    ) -> Vec<ValidationError> {
        let references = extract_references(value, prefix);
        trace!(value, count = references.len(), "scanned references");

        let mut messages = Vec::new();
        for reference in &references {
            if let Some(message) = check_reference(value, reference, names, context) {
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }

        messages
            .into_iter()
            .map(|message| ValidationError::reference(message, ""))
            .collect()
    }
}

impl ReferenceValidator for ParamReferenceValidator {
    fn validate_string_variable(
        &self,
        value: &str,
        prefix: &str,
        names: &ParamNameSets,
    ) -> Vec<ValidationError> {
        self.check(value, prefix, names, Context::String)
    }

    fn validate_array_variable(
        &self,
        value: &str,
        prefix: &str,
        names: &ParamNameSets,
    ) -> Vec<ValidationError> {
        self.check(value, prefix, names, Context::ArrayElement)
    }
}

fn check_reference(
    value: &str,
    reference: &Reference,
    names: &ParamNameSets,
    context: Context,
) -> Option<String> {
    let non_existent = || format!("non-existent variable in {:?}", value);

    if !names.contains(&reference.name) {
        return Some(non_existent());
    }

    if let Some(keys) = names.objects.get(&reference.name) {
        return match &reference.accessor {
            Accessor::Key(key) if !keys.contains(key) => Some(non_existent()),
            _ => None,
        };
    }

    if names.arrays.contains(&reference.name) {
        let whole_array = matches!(reference.accessor, Accessor::Whole | Accessor::Star);
        if !whole_array {
            return None;
        }
        return match context {
            Context::String => Some(format!("variable type invalid in {:?}", value)),
            Context::ArrayElement => {
                let isolated = value.trim() == format!("$({})", reference.expression);
                if isolated {
                    None
                } else {
                    Some(format!("variable is not properly isolated in {:?}", value))
                }
            }
        };
    }

    None
}

/// All `$(prefix.name...)` references in a value, in order of appearance
fn extract_references(value: &str, prefix: &str) -> Vec<Reference> {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let mut references = Vec::new();
    let mut pos = 0;

    while pos + 1 < len {
        if chars[pos] == '$' && chars[pos + 1] == '(' {
            if let Some(end) = find_closing_paren(&chars, pos + 2) {
                let expression: String = chars[pos + 2..end].iter().collect();
                if let Some(reference) = parse_reference(expression.trim(), prefix) {
                    references.push(reference);
                }
                pos = end + 1;
                continue;
            }
        }
        pos += 1;
    }

    references
}

fn find_closing_paren(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, &c) in chars.iter().enumerate().skip(start) {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_reference(expression: &str, prefix: &str) -> Option<Reference> {
    let rest = expression.strip_prefix(prefix)?.strip_prefix('.')?;

    let name_end = rest.find(&['.', '['][..]).unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() {
        return None;
    }

    let suffix = &rest[name_end..];
    let accessor = if suffix.is_empty() {
        Accessor::Whole
    } else if suffix == "[*]" {
        Accessor::Star
    } else if let Some(key) = suffix.strip_prefix('.') {
        Accessor::Key(key.to_string())
    } else if suffix
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .is_some_and(|idx| !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()))
    {
        Accessor::Index
    } else {
        Accessor::Unknown
    };

    Some(Reference {
        expression: expression.to_string(),
        name: name.to_string(),
        accessor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ValidationErrorKind;

    fn names() -> ParamNameSets {
        ParamNameSets::new()
            .with_string("registry")
            .with_array("platforms")
            .with_object("image", ["url", "digest"])
    }

    fn string_errors(value: &str) -> Vec<ValidationError> {
        ParamReferenceValidator.validate_string_variable(value, PARAMS_PREFIX, &names())
    }

    fn array_errors(value: &str) -> Vec<ValidationError> {
        ParamReferenceValidator.validate_array_variable(value, PARAMS_PREFIX, &names())
    }

    #[test]
    fn test_extract_references() {
        let refs = extract_references(
            "$(params.a)-$(params.b[*]) $(params.c.key) $(params.d[2]) $(tasks.x.results.y)",
            PARAMS_PREFIX,
        );
        let shapes: Vec<_> = refs
            .iter()
            .map(|r| (r.name.as_str(), r.accessor.clone()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("a", Accessor::Whole),
                ("b", Accessor::Star),
                ("c", Accessor::Key("key".to_string())),
                ("d", Accessor::Index),
            ]
        );
    }

    #[test]
    fn test_unterminated_reference_ignored() {
        assert!(extract_references("$(params.a", PARAMS_PREFIX).is_empty());
    }

    #[test]
    fn test_plain_values_pass() {
        assert!(string_errors("linux").is_empty());
        assert!(array_errors("linux").is_empty());
    }

    #[test]
    fn test_known_string_reference() {
        assert!(string_errors("$(params.registry)/app").is_empty());
        assert!(array_errors("$(params.registry)/app").is_empty());
    }

    #[test]
    fn test_unknown_reference() {
        let errors = string_errors("$(params.nope)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ReferenceError);
        assert!(errors[0].message.contains("non-existent variable"));
    }

    #[test]
    fn test_object_keys() {
        assert!(string_errors("$(params.image.url)").is_empty());
        let errors = string_errors("$(params.image.tag)");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("non-existent variable"));
    }

    #[test]
    fn test_array_in_string_context() {
        let errors = string_errors("$(params.platforms[*])");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("variable type invalid"));

        assert!(string_errors("$(params.platforms[0])").is_empty());
    }

    #[test]
    fn test_array_isolation() {
        assert!(array_errors("$(params.platforms[*])").is_empty());
        assert!(array_errors(" $(params.platforms) ").is_empty());

        let errors = array_errors("prefix-$(params.platforms[*])");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("not properly isolated"));
    }

    #[test]
    fn test_duplicate_findings_collapsed() {
        let errors = string_errors("$(params.nope)-$(params.other)");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_name_sets_from_specs() {
        let specs = vec![
            ParamSpec::new("a", ParamType::String),
            ParamSpec::new("b", ParamType::Array),
            ParamSpec::new("c", ParamType::Object).with_property("k"),
        ];
        let sets = ParamNameSets::from_specs(&specs);
        assert!(sets.strings.contains("a"));
        assert!(sets.arrays.contains("b"));
        assert!(sets.objects["c"].contains("k"));
    }
}
