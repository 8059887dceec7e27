// Task Parameter Data Models
// Typed parameters, matrix definitions and the task/pipeline documents that carry them

use crate::error::ValidationError;

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Deref;

// =============================================================================
// Parameter values
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Array,
    Object,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => f.write_str("string"),
            ParamType::Array => f.write_str("array"),
            ParamType::Object => f.write_str("object"),
        }
    }
}

/// A parameter value. The variant is the type tag: a scalar is a string,
/// a sequence is an array and a mapping is an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::String(String::new())
    }
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::String(_) => ParamType::String,
            ParamValue::Array(_) => ParamType::Array,
            ParamValue::Object(_) => ParamType::Object,
        }
    }

    /// Array elements, or an empty slice for non-array values
    pub fn as_array(&self) -> &[String] {
        match self {
            ParamValue::Array(values) => values,
            _ => &[],
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn from_yaml(value: &serde_yaml::Value) -> Result<Self, String> {
        match value {
            serde_yaml::Value::Sequence(seq) => seq
                .iter()
                .map(|item| {
                    yaml_scalar(item).ok_or_else(|| "array elements must be scalars".to_string())
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Array),
            serde_yaml::Value::Mapping(map) => {
                let mut object = BTreeMap::new();
                for (key, val) in map {
                    let key = key
                        .as_str()
                        .ok_or_else(|| "object keys must be strings".to_string())?;
                    let val = yaml_scalar(val)
                        .ok_or_else(|| format!("object value for '{}' must be a scalar", key))?;
                    object.insert(key.to_string(), val);
                }
                Ok(ParamValue::Object(object))
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
            serde_yaml::Value::Null => Err("param value must not be null".to_string()),
            scalar => yaml_scalar(scalar)
                .map(ParamValue::String)
                .ok_or_else(|| "unsupported param value".to_string()),
        }
    }
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        ParamValue::from_yaml(&raw).map_err(D::Error::custom)
    }
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            ParamValue::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Array(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::Array(values.into_iter().map(String::from).collect())
    }
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParamValue::String(value.into()))
    }

    pub fn array<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ParamValue::Array(values.into_iter().map(Into::into).collect()),
        )
    }
}

/// Ordered parameter list. Declaration order is preserved; uniqueness of
/// names is checked by validation, not by the container.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, param: Param) {
        self.0.push(param);
    }

    pub fn extend<I: IntoIterator<Item = Param>>(&mut self, params: I) {
        self.0.extend(params);
    }

    pub fn into_inner(self) -> Vec<Param> {
        self.0
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Set of all parameter names
    pub fn extract_names(&self) -> BTreeSet<String> {
        self.0.iter().map(|p| p.name.clone()).collect()
    }

    /// Map of every parameter name to its array values; non-array params map
    /// to an empty list
    pub fn extract_param_map_arr_vals(&self) -> HashMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|p| (p.name.clone(), p.value.as_array().to_vec()))
            .collect()
    }

    /// One error per repeated name, located at `[i].name` of the repeat.
    /// The details carry the index of the first declaration.
    pub fn duplicate_parameter_errors(&self) -> Vec<ValidationError> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut errors = Vec::new();

        for (i, param) in self.0.iter().enumerate() {
            match first_seen.get(param.name.as_str()).copied() {
                Some(first) => errors.push(
                    ValidationError::duplicate_parameter(&param.name, "name")
                        .via_index(i)
                        .with_details(format!("first declared at index {}", first)),
                ),
                None => {
                    first_seen.insert(param.name.as_str(), i);
                }
            }
        }

        errors
    }
}

impl Deref for Params {
    type Target = [Param];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Self(params)
    }
}

impl FromIterator<Param> for Params {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Params {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Matrix
// =============================================================================

/// Array parameters to fan out, plus explicitly named extra combinations
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Matrix {
    /// Array-typed parameters expanded into their cartesian product
    #[serde(default, skip_serializing_if = "<[Param]>::is_empty")]
    pub params: Params,

    /// Explicit combinations of string-typed parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: IncludeParamsList,
}

pub type IncludeParamsList = Vec<IncludeParams>;

/// A named combination of string parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IncludeParams {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub params: Params,
}

impl IncludeParams {
    pub fn new(name: impl Into<String>, params: impl Into<Params>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
        }
    }
}

// =============================================================================
// Declared parameters and task documents
// =============================================================================

/// Declared type of one key of an object parameter
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PropertySpec {
    #[serde(rename = "type", default)]
    pub property_type: ParamType,
}

/// A parameter declared by the owning pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,

    #[serde(rename = "type", default)]
    pub param_type: ParamType,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertySpec>,

    #[serde(default)]
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            properties: BTreeMap::new(),
            default: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>) -> Self {
        self.properties.insert(key.into(), PropertySpec::default());
        self
    }
}

/// A task within a pipeline, optionally fanned out by a matrix
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PipelineTask {
    pub name: String,

    /// Plain (non-matrix) parameters
    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub matrix: Option<Matrix>,
}

/// A pipeline document: declared params and the tasks that use them
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PipelineSpec {
    #[serde(default)]
    pub params: Vec<ParamSpec>,

    #[serde(default)]
    pub tasks: Vec<PipelineTask>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ValidationErrorKind;

    #[test]
    fn test_param_value_from_yaml_shapes() {
        let params: Params = serde_yaml::from_str(
            r#"
- name: os
  value: [linux, mac]
- name: version
  value: 3
- name: flag
  value: true
- name: image
  value:
    url: gcr.io/x
    digest: abc
"#,
        )
        .unwrap();

        assert_eq!(params.len(), 4);
        assert_eq!(params[0].value, ParamValue::from(vec!["linux", "mac"]));
        assert_eq!(params[1].value, ParamValue::from("3"));
        assert_eq!(params[2].value, ParamValue::from("true"));
        assert_eq!(params[3].value.param_type(), ParamType::Object);
    }

    #[test]
    fn test_param_value_rejects_null_and_nested() {
        assert!(serde_yaml::from_str::<Param>("name: a\nvalue: null\n").is_err());
        assert!(serde_yaml::from_str::<Param>("name: a\nvalue: [[1]]\n").is_err());
    }

    #[test]
    fn test_param_value_json_round_shape() {
        let param = Param::array("os", ["linux", "mac"]);
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "os", "value": ["linux", "mac"]})
        );
    }

    #[test]
    fn test_as_array_on_string_is_empty() {
        assert!(ParamValue::from("x").as_array().is_empty());
        assert_eq!(ParamValue::from("x").as_str(), Some("x"));
    }

    #[test]
    fn test_extract_names_and_array_map() {
        let params = Params::from(vec![
            Param::array("os", ["linux"]),
            Param::string("mode", "fast"),
        ]);

        let names = params.extract_names();
        assert!(names.contains("os"));
        assert!(names.contains("mode"));

        let arrays = params.extract_param_map_arr_vals();
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays["os"], vec!["linux".to_string()]);
        assert!(arrays["mode"].is_empty());
    }

    #[test]
    fn test_duplicate_parameter_errors() {
        let params = Params::from(vec![
            Param::array("a", ["1"]),
            Param::array("b", ["1"]),
            Param::array("a", ["2"]),
            Param::array("a", ["3"]),
        ]);

        let errors = params.duplicate_parameter_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::DuplicateParameter));
        assert_eq!(errors[0].path(), "[2].name");
        assert_eq!(errors[1].path(), "[3].name");
        assert!(errors
            .iter()
            .all(|e| e.details.as_deref() == Some("first declared at index 0")));
    }

    #[test]
    fn test_parse_pipeline_task_with_matrix() {
        let task: PipelineTask = serde_yaml::from_str(
            r#"
name: build
params:
  - name: mode
    value: release
matrix:
  params:
    - name: os
      value: [linux, mac]
  include:
    - name: windows-extra
      params:
        - name: os
          value: windows
"#,
        )
        .unwrap();

        let matrix = task.matrix.unwrap();
        assert_eq!(matrix.params.len(), 1);
        assert_eq!(matrix.include.len(), 1);
        assert_eq!(matrix.include[0].name, "windows-extra");
        assert_eq!(task.params[0].value.as_str(), Some("release"));
    }

    #[test]
    fn test_param_spec_properties() {
        let spec: ParamSpec = serde_yaml::from_str(
            r#"
name: image
type: object
properties:
  url: {}
  digest:
    type: string
"#,
        )
        .unwrap();

        assert_eq!(spec.param_type, ParamType::Object);
        assert!(spec.properties.contains_key("url"));
        assert!(spec.properties.contains_key("digest"));
    }
}
