//! In-memory issue store
//!
//! Issues are kept per project, in insertion order. Nothing is written to
//! disk; a fresh store is empty.

use crate::error::Action;
use crate::{DeleteIssue, Error, Issue, IssueFilter, IssueUpdate, NewIssue, Result, generate_id};
use std::collections::HashMap;

/// Project-partitioned issue store
#[derive(Debug, Default)]
pub struct Store {
    projects: HashMap<String, Vec<Issue>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues in `project` that satisfy `filter`, in insertion order
    ///
    /// An unknown project yields an empty list.
    pub fn list(&self, project: &str, filter: &IssueFilter) -> Vec<Issue> {
        let Some(issues) = self.projects.get(project) else {
            return Vec::new();
        };
        if filter.is_empty() {
            return issues.clone();
        }
        issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect()
    }

    #[cfg(test)]
    fn get(&self, project: &str, id: &str) -> Option<&Issue> {
        self.projects
            .get(project)
            .and_then(|issues| issues.iter().find(|issue| issue.id == id))
    }

    /// Create a new issue at the end of the project's collection
    pub fn create(&mut self, project: &str, fields: NewIssue) -> Result<Issue> {
        let fields = fields.validate()?;
        let issue = Issue::new(self.next_id(), fields);

        self.projects
            .entry(project.to_string())
            .or_default()
            .push(issue.clone());

        Ok(issue)
    }

    /// Update an existing issue, returning its ID
    ///
    /// Checks run in order: missing id, nothing to change, unknown id.
    pub fn update(&mut self, project: &str, changes: IssueUpdate) -> Result<String> {
        let id = present_id(changes.id.as_deref())?;

        if !changes.has_changes() {
            return Err(Error::NoUpdateFields { id });
        }

        let issue = self
            .projects
            .get_mut(project)
            .and_then(|issues| issues.iter_mut().find(|issue| issue.id == id))
            .ok_or_else(|| Error::NotFound {
                id: id.clone(),
                action: Action::Update,
            })?;

        issue.apply(changes);
        Ok(id)
    }

    /// Remove an issue, returning its ID
    pub fn delete(&mut self, project: &str, request: DeleteIssue) -> Result<String> {
        let id = present_id(request.id.as_deref())?;

        let not_found = || Error::NotFound {
            id: id.clone(),
            action: Action::Delete,
        };

        let issues = self.projects.get_mut(project).ok_or_else(not_found)?;
        let pos = issues
            .iter()
            .position(|issue| issue.id == id)
            .ok_or_else(not_found)?;
        issues.remove(pos);

        if issues.is_empty() {
            self.projects.remove(project);
        }

        Ok(id)
    }

    /// Number of projects holding at least one issue
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Total number of issues across all projects
    pub fn len(&self) -> usize {
        self.projects.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Whether any project holds an issue with this ID
    fn contains_id(&self, id: &str) -> bool {
        self.projects
            .values()
            .flatten()
            .any(|issue| issue.id == id)
    }

    fn next_id(&self) -> String {
        loop {
            let id = generate_id();
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}

fn present_id(id: Option<&str>) -> Result<String> {
    match id {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(Error::MissingId),
    }
}
