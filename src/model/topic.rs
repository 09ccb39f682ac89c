//! Topic attribute carried by every node.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

/// A node's topic: one label, or a set of labels.
///
/// Diversity counting walks [`Topic::labels`], so both shapes share one
/// code path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Topic {
    Label(String),
    Labels(BTreeSet<String>),
}

impl Topic {
    pub fn label(label: impl Into<String>) -> Self {
        Topic::Label(label.into())
    }

    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Topic::Labels(labels.into_iter().map(Into::into).collect())
    }

    /// Iterate every label this topic contributes.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let (single, many) = match self {
            Topic::Label(l) => (Some(l.as_str()), None),
            Topic::Labels(set) => (None, Some(set.iter().map(String::as_str))),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        match self {
            Topic::Label(_) => 1,
            Topic::Labels(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Topic::Label(s.to_string())
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Topic::Label(s)
    }
}

impl<S: Into<String>> FromIterator<S> for Topic {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Topic::labels(iter)
    }
}
