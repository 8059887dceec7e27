// Matrix Combinations
// One row of a fan-out: parameter name to a single string value

use crate::parser::models::{Param, Params};

use std::collections::BTreeMap;

/// A single combination of matrix values.
///
/// Keys are stored in a `BTreeMap`, so iteration is always in lexicographic
/// name order no matter how the combination was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination(BTreeMap<String, String>);

impl Combination {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// A copy of this combination with one more name/value pair
    pub fn extended(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.0.insert(name.to_string(), value.to_string());
        next
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameter names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flat string params, ordered by name
    pub fn to_params(&self) -> Params {
        self.iter().map(|(name, value)| Param::string(name, value)).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Combination {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

pub type Combinations = Vec<Combination>;

/// Convert combinations into one flat param list each, ready to be
/// substituted into a child execution
pub fn to_params(combinations: &[Combination]) -> Vec<Params> {
    combinations.iter().map(Combination::to_params).collect()
}
