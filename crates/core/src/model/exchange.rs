use serde_json::Value;
use thiserror::Error;

use crate::model::capsule::{Capsule, CapsuleDraft, SCHEMA_TAG};

/// Why an exchange document was refused.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExchangeError {
    #[error("Error reading file. Make sure it is a valid JSON file.")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid file format. Please select a valid Pocket Classroom JSON file.")]
    UnsupportedSchema { found: Option<String> },
}

/// Parse an exchange document, checking the schema tag before anything else.
///
/// # Errors
///
/// Returns `ExchangeError::Malformed` for text that is not JSON or does not
/// fit the capsule shape, and `ExchangeError::UnsupportedSchema` when the
/// top-level `schema` is missing or not `pocket-classroom/v1`.
pub fn parse_document(text: &str) -> Result<CapsuleDraft, ExchangeError> {
    let value: Value = serde_json::from_str(text)?;
    match value.get("schema").and_then(Value::as_str) {
        Some(SCHEMA_TAG) => {}
        other => {
            return Err(ExchangeError::UnsupportedSchema {
                found: other.map(str::to_owned),
            });
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Pretty-printed document for a capsule.
///
/// # Errors
///
/// Returns `ExchangeError::Malformed` if serialization fails.
pub fn export_document(capsule: &Capsule) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string_pretty(&capsule.to_draft())?)
}

/// File name an export is offered under: the title with spaces turned into
/// underscores.
#[must_use]
pub fn export_file_name(title: &str) -> String {
    let title = title.trim();
    let stem = if title.is_empty() { "capsule" } else { title };
    format!("{}.json", stem.replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::CapsuleId;

    #[test]
    fn rejects_foreign_schema() {
        let err = parse_document(r#"{"schema": "other/v2", "meta": {"title": "x"}}"#).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::UnsupportedSchema { found: Some(ref s) } if s == "other/v2"
        ));
    }

    #[test]
    fn rejects_missing_schema() {
        let err = parse_document(r#"{"meta": {"title": "x"}}"#).unwrap_err();
        assert!(matches!(err, ExchangeError::UnsupportedSchema { found: None }));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_document("not json at all").unwrap_err();
        assert!(matches!(err, ExchangeError::Malformed(_)));
    }

    #[test]
    fn accepts_document_without_id() {
        let draft = parse_document(
            r#"{"schema": "pocket-classroom/v1", "meta": {"title": "Imported"}, "notes": ["n"]}"#,
        )
        .unwrap();
        assert!(draft.id.is_none());
        assert_eq!(draft.meta.title, "Imported");
    }

    #[test]
    fn accepts_loose_level_labels() {
        for level in [r#""""#, "null", r#""advanced""#] {
            let text = format!(
                r#"{{"schema": "pocket-classroom/v1", "meta": {{"title": "T", "level": {level}}}, "notes": ["n"]}}"#
            );
            let draft = parse_document(&text).unwrap();
            assert_eq!(draft.meta.title, "T", "level {level} should import");
        }
    }

    #[test]
    fn export_carries_schema_and_parses_back() {
        let mut draft = CapsuleDraft::empty(CapsuleId::new("capsule-x").unwrap());
        draft.meta.title = "Cell Biology".into();
        draft.notes.push("Mitochondria".into());
        let capsule = draft.validate().unwrap();

        let text = export_document(&capsule).unwrap();
        let parsed = parse_document(&text).unwrap();
        assert_eq!(parsed.validate().unwrap(), capsule);
    }

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(export_file_name("Cell Biology 101"), "Cell_Biology_101.json");
        assert_eq!(export_file_name("  "), "capsule.json");
    }
}
