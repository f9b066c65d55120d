//! Exact-match filtering for issue listings
//!
//! Every criterion must match (AND). A criterion on a name that is not an
//! issue field matches nothing.

use crate::Issue;
use std::collections::BTreeMap;

/// Field-name to expected-value criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    criteria: BTreeMap<String, String>,
}

impl IssueFilter {
    /// A filter that matches every issue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion, replacing any earlier value for the same field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Whether `issue` satisfies every criterion
    pub fn matches(&self, issue: &Issue) -> bool {
        self.criteria.iter().all(|(field, expected)| {
            issue
                .field_text(field)
                .is_some_and(|actual| actual == expected.as_str())
        })
    }
}

impl<K, V> FromIterator<(K, V)> for IssueFilter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            criteria: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
