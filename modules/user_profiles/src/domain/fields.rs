//! Key-by-key update rules for blob-form documents.
//!
//! Every recognized top-level key maps to one [`FieldRule`]; keys outside
//! [`FIELD_RULES`] are ignored, as are values whose JSON type does not fit
//! the rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::contract::model::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectField {
    Profile,
    Preferences,
}

impl ObjectField {
    fn slot(self, p: &mut UserProfile) -> &mut Map<String, Value> {
        match self {
            Self::Profile => &mut p.profile,
            Self::Preferences => &mut p.preferences,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Username,
    Email,
}

impl TextField {
    fn slot(self, p: &mut UserProfile) -> &mut String {
        match self {
            Self::Username => &mut p.username,
            Self::Email => &mut p.email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// One-level merge of an object; nested values are replaced whole.
    MergeObject(ObjectField),
    /// Wholesale replacement with an array of strings.
    ReplaceTags,
    /// Lenient ISO-8601 parse into `lastLogin`.
    Timestamp,
    /// Boolean overwrite of `isActive`.
    Flag,
    Text(TextField),
    Immutable,
}

pub const FIELD_RULES: &[(&str, FieldRule)] = &[
    ("profile", FieldRule::MergeObject(ObjectField::Profile)),
    ("preferences", FieldRule::MergeObject(ObjectField::Preferences)),
    ("tags", FieldRule::ReplaceTags),
    ("lastLogin", FieldRule::Timestamp),
    ("isActive", FieldRule::Flag),
    ("username", FieldRule::Text(TextField::Username)),
    ("email", FieldRule::Text(TextField::Email)),
    ("userId", FieldRule::Immutable),
    ("createdAt", FieldRule::Immutable),
];

pub fn rule_for(key: &str) -> Option<FieldRule> {
    FIELD_RULES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| *rule)
}

impl FieldRule {
    /// Returns false when the value was ignored.
    pub fn apply(self, target: &mut UserProfile, value: Value) -> bool {
        match self {
            Self::MergeObject(field) => match value {
                Value::Object(incoming) => {
                    field.slot(target).extend(incoming);
                    true
                }
                _ => false,
            },
            Self::ReplaceTags => match string_list(value) {
                Some(tags) => {
                    target.tags = tags;
                    true
                }
                None => false,
            },
            Self::Timestamp => match value.as_str().and_then(parse_timestamp) {
                Some(ts) => {
                    target.last_login = Some(ts);
                    true
                }
                None => false,
            },
            Self::Flag => match value {
                Value::Bool(b) => {
                    target.is_active = b;
                    true
                }
                _ => false,
            },
            Self::Text(field) => match value {
                Value::String(s) => {
                    *field.slot(target) = s;
                    true
                }
                _ => false,
            },
            Self::Immutable => false,
        }
    }
}

/// Apply every key of `doc` to `target` through [`FIELD_RULES`].
pub fn apply_document(target: &mut UserProfile, doc: Map<String, Value>) {
    for (key, value) in doc {
        match rule_for(&key) {
            Some(rule) => {
                if !rule.apply(target, value) {
                    debug!(key = %key, "update value ignored");
                }
            }
            None => debug!(key = %key, "unknown key ignored"),
        }
    }
}

fn string_list(value: Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// ISO-8601 in the shapes clients actually send. A trailing `Z` means UTC,
/// offsets are normalized to UTC, values without an offset are taken as UTC
/// and a bare date is midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
