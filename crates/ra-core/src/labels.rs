//! Dense class-index to label mapping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{AdjustResult, InvalidInputError};

/// Maps class indices `0..N-1` to human-readable labels.
///
/// A `LabelMapping` is always dense and its labels are unique, so lookups by
/// index never fail for indices below [`LabelMapping::len`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelMapping {
    labels: Vec<String>,
}

impl LabelMapping {
    /// Creates a mapping where each label's position is its class index.
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> AdjustResult<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(InvalidInputError::EmptyMapping);
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(InvalidInputError::DuplicateLabel(label.clone()));
            }
        }

        Ok(Self { labels })
    }

    /// Creates a mapping from `(index, label)` pairs in any order.
    ///
    /// The indices must be exactly `0..N-1` where `N` is the number of pairs.
    pub fn from_indexed<S: Into<String>>(
        pairs: impl IntoIterator<Item = (usize, S)>,
    ) -> AdjustResult<Self> {
        let pairs: Vec<(usize, String)> = pairs.into_iter().map(|(i, l)| (i, l.into())).collect();
        let expected = pairs.len();

        let mut slots: Vec<Option<String>> = vec![None; expected];
        for (index, label) in pairs {
            let slot = slots
                .get_mut(index)
                .ok_or(InvalidInputError::NonDenseMapping {
                    expected,
                    found: index,
                })?;
            if slot.is_some() {
                return Err(InvalidInputError::DuplicateIndex(index));
            }
            *slot = Some(label);
        }

        // With every index in range and no duplicates, all slots are filled.
        let labels: Vec<String> = slots.into_iter().flatten().collect();
        Self::new(labels)
    }

    /// Returns the number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: an empty mapping cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the label for a class index.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Returns the class index for a label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Returns all labels in class-index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterates over `(index, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().enumerate().map(|(i, l)| (i, l.as_str()))
    }
}

impl TryFrom<Vec<String>> for LabelMapping {
    type Error = InvalidInputError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<LabelMapping> for Vec<String> {
    fn from(mapping: LabelMapping) -> Self {
        mapping.labels
    }
}

impl TryFrom<HashMap<usize, String>> for LabelMapping {
    type Error = InvalidInputError;

    fn try_from(map: HashMap<usize, String>) -> Result<Self, Self::Error> {
        Self::from_indexed(map)
    }
}

impl TryFrom<BTreeMap<usize, String>> for LabelMapping {
    type Error = InvalidInputError;

    fn try_from(map: BTreeMap<usize, String>) -> Result<Self, Self::Error> {
        Self::from_indexed(map)
    }
}
