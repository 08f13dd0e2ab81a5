//! Template/schema consistency checks.
//!
//! A template and its field schema are edited separately and drift apart:
//! a tag gets typed into the document without a field, or a field is added
//! that no tag uses. [`check`] reports both directions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::DocxDocument;
use crate::tags::extract_tags;

pub const CONSISTENT: &str = "Template tags are consistent with fields";
pub const EXTRA_IN_DOCUMENT: &str = "Document contains tags missing from fields";
pub const EXTRA_IN_SCHEMA: &str = "Fields are not referenced by document tags";

/// Tags present on one side only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Tags used by the document but declared by no field.
    pub extra_in_document: BTreeSet<String>,
    /// Field tags the document never uses.
    pub extra_in_schema: BTreeSet<String>,
}

impl TagDiff {
    pub fn between(document_tags: &BTreeSet<String>, field_tags: &BTreeSet<String>) -> Self {
        Self {
            extra_in_document: document_tags.difference(field_tags).cloned().collect(),
            extra_in_schema: field_tags.difference(document_tags).cloned().collect(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.extra_in_document.is_empty() && self.extra_in_schema.is_empty()
    }

    pub fn report(&self) -> ConsistencyReport {
        if self.is_consistent() {
            return ConsistencyReport::Consistent {
                result: CONSISTENT.to_string(),
            };
        }
        let mut errors = Vec::new();
        if !self.extra_in_document.is_empty() {
            errors.push(ConsistencyError {
                message: EXTRA_IN_DOCUMENT.to_string(),
                tags: self.extra_in_document.iter().cloned().collect(),
            });
        }
        if !self.extra_in_schema.is_empty() {
            errors.push(ConsistencyError {
                message: EXTRA_IN_SCHEMA.to_string(),
                tags: self.extra_in_schema.iter().cloned().collect(),
            });
        }
        ConsistencyReport::Inconsistent { errors }
    }
}

/// One direction of a mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyError {
    pub message: String,
    pub tags: Vec<String>,
}

/// Serializable outcome: `{"result": ...}` or `{"errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsistencyReport {
    Consistent { result: String },
    Inconsistent { errors: Vec<ConsistencyError> },
}

/// Compares the tags of a template with a schema's field tags.
///
/// A missing template, or one that cannot be read, contributes no tags; the
/// failure is logged and every field is reported as unreferenced.
pub fn check(source: Option<&[u8]>, field_tags: &BTreeSet<String>) -> TagDiff {
    let document_tags = source.map(document_tags).unwrap_or_default();
    TagDiff::between(&document_tags, field_tags)
}

fn document_tags(bytes: &[u8]) -> BTreeSet<String> {
    let doc = match DocxDocument::open(bytes) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("consistency check: cannot open template: {err}");
            return BTreeSet::new();
        }
    };
    match extract_tags(&doc) {
        Ok(tags) => tags,
        Err(err) => {
            log::warn!("consistency check: cannot extract tags: {err}");
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_both_directions() {
        let diff = TagDiff::between(&set(&["A", "B", "C"]), &set(&["B", "C", "D"]));
        assert_eq!(diff.extra_in_document, set(&["A"]));
        assert_eq!(diff.extra_in_schema, set(&["D"]));
        assert!(!diff.is_consistent());
    }

    #[test]
    fn test_report_json_shapes() {
        let ok = TagDiff::default().report();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "result": CONSISTENT })
        );

        let diff = TagDiff::between(&set(&["A"]), &set(&["D"]));
        assert_eq!(
            serde_json::to_value(diff.report()).unwrap(),
            serde_json::json!({ "errors": [
                { "message": EXTRA_IN_DOCUMENT, "tags": ["A"] },
                { "message": EXTRA_IN_SCHEMA, "tags": ["D"] },
            ]})
        );
    }

    #[test]
    fn test_one_sided_report() {
        let diff = TagDiff::between(&set(&[]), &set(&["x"]));
        match diff.report() {
            ConsistencyReport::Inconsistent { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, EXTRA_IN_SCHEMA);
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_document_has_no_tags() {
        let diff = check(Some(b"garbage"), &set(&["x"]));
        assert!(diff.extra_in_document.is_empty());
        assert_eq!(diff.extra_in_schema, set(&["x"]));
        assert_eq!(check(None, &set(&[])), TagDiff::default());
    }
}
