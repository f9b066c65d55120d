//! Issue data model for issuetrack
//!
//! Field names on the wire follow the tracker's JSON contract (`_id`,
//! `issue_title`, ...), so the serde attributes here are part of the API.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;

/// Core issue structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier, shared by no other issue in any project
    #[serde(rename = "_id")]
    pub id: String,

    pub issue_title: String,

    pub issue_text: String,

    pub created_by: String,

    /// Empty when nobody is assigned
    #[serde(default)]
    pub assigned_to: String,

    #[serde(default)]
    pub status_text: String,

    /// When the issue was created
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,

    /// When the issue was last updated
    #[serde(with = "timestamp")]
    pub updated_on: DateTime<Utc>,

    pub open: bool,
}

impl Issue {
    /// Create a new open issue from already-validated fields
    pub fn new(id: String, fields: ValidIssue) -> Self {
        let now = timestamp::now();
        Self {
            id,
            issue_title: fields.issue_title,
            issue_text: fields.issue_text,
            created_by: fields.created_by,
            assigned_to: fields.assigned_to,
            status_text: fields.status_text,
            created_on: now,
            updated_on: now,
            open: true,
        }
    }

    /// String form of a field, keyed by its wire name
    ///
    /// Returns `None` for names that are not issue fields, so filters on
    /// them never match.
    pub fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        let text = match field {
            "_id" => Cow::Borrowed(self.id.as_str()),
            "issue_title" => Cow::Borrowed(self.issue_title.as_str()),
            "issue_text" => Cow::Borrowed(self.issue_text.as_str()),
            "created_by" => Cow::Borrowed(self.created_by.as_str()),
            "assigned_to" => Cow::Borrowed(self.assigned_to.as_str()),
            "status_text" => Cow::Borrowed(self.status_text.as_str()),
            "created_on" => Cow::Owned(timestamp::format(&self.created_on)),
            "updated_on" => Cow::Owned(timestamp::format(&self.updated_on)),
            "open" => Cow::Borrowed(if self.open { "true" } else { "false" }),
            _ => return None,
        };
        Some(text)
    }

    /// Apply an update in place and refresh `updated_on`
    ///
    /// Required text fields only change when the new value is non-empty;
    /// `assigned_to` and `status_text` change whenever they are present.
    pub fn apply(&mut self, changes: IssueUpdate) {
        if let Some(title) = changes.issue_title.filter(|s| !s.is_empty()) {
            self.issue_title = title;
        }
        if let Some(text) = changes.issue_text.filter(|s| !s.is_empty()) {
            self.issue_text = text;
        }
        if let Some(author) = changes.created_by.filter(|s| !s.is_empty()) {
            self.created_by = author;
        }
        if let Some(assignee) = changes.assigned_to {
            self.assigned_to = assignee;
        }
        if let Some(status) = changes.status_text {
            self.status_text = status;
        }
        if let Some(open) = changes.open {
            self.open = open.as_bool();
        }
        self.touch();
    }

    /// Refresh `updated_on`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_on = timestamp::now().max(self.updated_on);
    }
}

/// Fields accepted when creating an issue
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewIssue {
    #[serde(default, deserialize_with = "text_field")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub status_text: Option<String>,
}

/// A [`NewIssue`] whose required fields are known to be present
#[derive(Debug, Clone)]
pub struct ValidIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl NewIssue {
    /// Shorthand for the three required fields
    pub fn new(
        issue_title: impl Into<String>,
        issue_text: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            issue_title: Some(issue_title.into()),
            issue_text: Some(issue_text.into()),
            created_by: Some(created_by.into()),
            ..Default::default()
        }
    }

    /// Check the required fields, defaulting the optional ones to empty
    pub fn validate(self) -> crate::Result<ValidIssue> {
        match (
            non_empty(self.issue_title),
            non_empty(self.issue_text),
            non_empty(self.created_by),
        ) {
            (Some(issue_title), Some(issue_text), Some(created_by)) => Ok(ValidIssue {
                issue_title,
                issue_text,
                created_by,
                assigned_to: self.assigned_to.unwrap_or_default(),
                status_text: self.status_text.unwrap_or_default(),
            }),
            _ => Err(crate::Error::Validation),
        }
    }
}

/// Fields accepted when updating an issue
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueUpdate {
    #[serde(rename = "_id", default, deserialize_with = "text_field")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub status_text: Option<String>,
    /// `null` reads as absent here too, so it never closes an issue
    #[serde(default)]
    pub open: Option<OpenFlag>,
}

impl IssueUpdate {
    /// Update targeting `id` with no fields set
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Whether any mutable field carries a truthy value
    ///
    /// An explicit `open: false` counts as nothing sent, even though
    /// [`Issue::apply`] would honour it.
    pub fn has_changes(&self) -> bool {
        [
            &self.issue_title,
            &self.issue_text,
            &self.created_by,
            &self.assigned_to,
            &self.status_text,
        ]
        .into_iter()
        .any(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
            || self.open.as_ref().is_some_and(OpenFlag::is_truthy)
    }
}

/// Body of a delete request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteIssue {
    #[serde(rename = "_id", default, deserialize_with = "text_field")]
    pub id: Option<String>,
}

impl DeleteIssue {
    pub fn for_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// The `open` value of an update, as sent by the client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OpenFlag {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl OpenFlag {
    /// The stored value: only `true` and `"true"` open an issue
    pub fn as_bool(&self) -> bool {
        match self {
            OpenFlag::Bool(b) => *b,
            OpenFlag::Text(s) => s == "true",
            OpenFlag::Other(_) => false,
        }
    }

    /// Loose truthiness, as used to decide whether anything was sent
    pub fn is_truthy(&self) -> bool {
        match self {
            OpenFlag::Bool(b) => *b,
            OpenFlag::Text(s) => !s.is_empty(),
            OpenFlag::Other(serde_json::Value::Null) => false,
            OpenFlag::Other(serde_json::Value::Number(n)) => {
                n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan())
            }
            OpenFlag::Other(_) => true,
        }
    }
}

impl From<bool> for OpenFlag {
    fn from(value: bool) -> Self {
        OpenFlag::Bool(value)
    }
}

impl From<&str> for OpenFlag {
    fn from(value: &str) -> Self {
        OpenFlag::Text(value.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Accept strings, numbers and booleans for a text field
///
/// `false` and zero arrive as the empty string: they are sent, but falsy,
/// so required-field, `_id` and nothing-to-update checks reject them the
/// same way they reject `""`. Explicit `null` reads as absent, unlike
/// clients that distinguish it from a missing key; a `null` never
/// overwrites `assigned_to` or `status_text`.
fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v == 0.0) => Ok(Some(String::new())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(false)) => Ok(Some(String::new())),
        Some(Value::Bool(true)) => Ok(Some("true".to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {}",
            match other {
                Value::Array(_) => "an array",
                _ => "an object",
            }
        ))),
    }
}

/// Millisecond-precision RFC 3339 timestamps (`2024-05-01T12:00:00.000Z`)
pub mod timestamp {
    use super::*;

    /// Current time, truncated to what the wire format can carry
    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Issue {
        let fields = NewIssue::new("Title", "Text", "alice").validate().unwrap();
        Issue::new("id-1".to_string(), fields)
    }

    #[test]
    fn test_new_issue_defaults() {
        let issue = sample();
        assert!(issue.open);
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.status_text, "");
        assert_eq!(issue.created_on, issue.updated_on);
    }

    #[test]
    fn test_validate_requires_all_three() {
        let mut missing_text = NewIssue::new("T", "X", "U");
        missing_text.issue_text = None;
        assert!(matches!(
            missing_text.validate(),
            Err(crate::Error::Validation)
        ));

        let empty_author = NewIssue::new("T", "X", "");
        assert!(matches!(
            empty_author.validate(),
            Err(crate::Error::Validation)
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let issue = sample();
        let text = serde_json::to_string(&issue).unwrap();
        let positions: Vec<usize> = [
            "_id",
            "issue_title",
            "issue_text",
            "created_by",
            "assigned_to",
            "status_text",
            "created_on",
            "updated_on",
            "open",
        ]
        .iter()
        .map(|key| text.find(&format!("\"{key}\":")).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

        let value = serde_json::to_value(&issue).unwrap();
        let created = value["created_on"].as_str().unwrap();
        assert!(created.ends_with('Z'));
        assert_eq!(created.len(), "2024-05-01T12:00:00.000Z".len());

        let back: Issue = serde_json::from_value(value).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn test_field_text_table() {
        let issue = sample();
        assert_eq!(issue.field_text("_id").as_deref(), Some("id-1"));
        assert_eq!(issue.field_text("open").as_deref(), Some("true"));
        assert_eq!(issue.field_text("assigned_to").as_deref(), Some(""));
        assert_eq!(
            issue.field_text("created_on").unwrap(),
            timestamp::format(&issue.created_on)
        );
        assert_eq!(issue.field_text("id"), None);
        assert_eq!(issue.field_text("priority"), None);
    }

    #[test]
    fn test_apply_respects_field_rules() {
        let mut issue = sample();
        issue.assigned_to = "bob".into();
        issue.status_text = "triaged".into();

        issue.apply(IssueUpdate {
            issue_title: Some(String::new()),
            assigned_to: Some(String::new()),
            ..IssueUpdate::for_id("id-1")
        });

        assert_eq!(issue.issue_title, "Title");
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.status_text, "triaged");
        assert!(issue.open);
    }

    #[test]
    fn test_apply_open_coercion() {
        let mut issue = sample();
        issue.apply(IssueUpdate {
            open: Some("false".into()),
            ..Default::default()
        });
        assert!(!issue.open);

        issue.apply(IssueUpdate {
            open: Some("true".into()),
            ..Default::default()
        });
        assert!(issue.open);

        issue.apply(IssueUpdate {
            open: Some("yes".into()),
            ..Default::default()
        });
        assert!(!issue.open);

        issue.apply(IssueUpdate {
            open: Some(true.into()),
            ..Default::default()
        });
        assert!(issue.open);
    }

    #[test]
    fn test_touch_never_goes_backwards() {
        let mut issue = sample();
        let future = issue.updated_on + chrono::Duration::hours(1);
        issue.updated_on = future;
        issue.touch();
        assert_eq!(issue.updated_on, future);
        assert!(issue.updated_on >= issue.created_on);
    }

    #[test]
    fn test_has_changes() {
        assert!(!IssueUpdate::for_id("a").has_changes());

        let blank_title = IssueUpdate {
            issue_title: Some(String::new()),
            ..IssueUpdate::for_id("a")
        };
        assert!(!blank_title.has_changes());

        let assignee = IssueUpdate {
            assigned_to: Some("bob".into()),
            ..IssueUpdate::for_id("a")
        };
        assert!(assignee.has_changes());

        let reopen = IssueUpdate {
            open: Some(true.into()),
            ..IssueUpdate::for_id("a")
        };
        assert!(reopen.has_changes());
    }

    #[test]
    fn test_open_false_alone_reads_as_no_changes() {
        let close = IssueUpdate {
            open: Some(false.into()),
            ..IssueUpdate::for_id("a")
        };
        assert!(!close.has_changes());

        // The string form is non-empty, so it does count.
        let close_text = IssueUpdate {
            open: Some("false".into()),
            ..IssueUpdate::for_id("a")
        };
        assert!(close_text.has_changes());
    }

    #[test]
    fn test_deserialize_loose_values() {
        let update: IssueUpdate = serde_json::from_value(json!({
            "_id": "abc",
            "issue_title": 42,
            "assigned_to": null,
            "open": 1,
            "unknown": "ignored"
        }))
        .unwrap();

        assert_eq!(update.id.as_deref(), Some("abc"));
        assert_eq!(update.issue_title.as_deref(), Some("42"));
        assert_eq!(update.assigned_to, None);
        assert_eq!(update.open, Some(OpenFlag::Other(json!(1))));
        assert!(update.open.as_ref().unwrap().is_truthy());
        assert!(!update.open.as_ref().unwrap().as_bool());
    }

    #[test]
    fn test_falsy_scalars_read_as_empty() {
        let cases = [
            (json!(false), Some("")),
            (json!(0), Some("")),
            (json!(0.0), Some("")),
            (json!(true), Some("true")),
            (json!(7), Some("7")),
            (json!(""), Some("")),
            (json!(null), None),
        ];
        for (value, expected) in cases {
            let update: IssueUpdate =
                serde_json::from_value(json!({ "_id": value.clone(), "issue_title": value.clone() }))
                    .unwrap();
            assert_eq!(update.id.as_deref(), expected, "_id from {value}");
            assert_eq!(update.issue_title.as_deref(), expected, "issue_title from {value}");
        }
    }

    #[test]
    fn test_falsy_required_fields_fail_validation() {
        let cases = [
            json!({ "issue_title": false, "issue_text": 0, "created_by": "u" }),
            json!({ "issue_title": "t", "issue_text": "x", "created_by": false }),
            json!({ "issue_title": 0, "issue_text": "x", "created_by": "u" }),
        ];
        for body in cases {
            let fields: NewIssue = serde_json::from_value(body.clone()).unwrap();
            assert!(
                matches!(fields.validate(), Err(crate::Error::Validation)),
                "{body} should be rejected"
            );
        }

        let truthy: NewIssue =
            serde_json::from_value(json!({ "issue_title": 1, "issue_text": true, "created_by": "u" }))
                .unwrap();
        let valid = truthy.validate().unwrap();
        assert_eq!(valid.issue_title, "1");
        assert_eq!(valid.issue_text, "true");
    }

    #[test]
    fn test_falsy_update_fields_are_not_changes() {
        let cases = [
            json!({ "_id": "a", "issue_title": false }),
            json!({ "_id": "a", "issue_text": 0 }),
            json!({ "_id": "a", "assigned_to": false, "status_text": 0 }),
            json!({ "_id": "a", "open": 0 }),
        ];
        for body in cases {
            let update: IssueUpdate = serde_json::from_value(body.clone()).unwrap();
            assert!(!update.has_changes(), "{body} should carry no changes");
        }
    }

    #[test]
    fn test_falsy_assignee_clears_when_applied() {
        let mut issue = sample();
        issue.assigned_to = "bob".into();
        let update: IssueUpdate = serde_json::from_value(json!({
            "_id": "id-1",
            "assigned_to": false,
            "issue_title": false,
            "status_text": "triaged"
        }))
        .unwrap();

        issue.apply(update);
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.issue_title, "Title");
        assert_eq!(issue.status_text, "triaged");
    }

    #[test]
    fn test_null_open_never_closes() {
        let mut issue = sample();
        let update: IssueUpdate = serde_json::from_value(
            json!({ "_id": "id-1", "open": null, "status_text": "triaged" }),
        )
        .unwrap();
        assert_eq!(update.open, None);

        issue.apply(update);
        assert!(issue.open);
        assert_eq!(issue.status_text, "triaged");
    }

    #[test]
    fn test_deserialize_rejects_structured_text() {
        let result: Result<NewIssue, _> =
            serde_json::from_value(json!({ "issue_title": ["a", "b"] }));
        assert!(result.is_err());
    }
}
