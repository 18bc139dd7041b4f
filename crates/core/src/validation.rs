//! Submission validation, pure logic, no database access.
//!
//! Turns a raw public submission into a [`NewContribution`] or a list of
//! field-level violations. Optional text fields that are null, empty, or
//! whitespace-only are treated as absent before any rule runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::contribution::{ContributionType, NewContribution};
use crate::entity::WriteMode;

/// Raw body of a public contribution submission.
///
/// `type` and `proposed_payload` are kept as loose JSON so that wrong shapes
/// are reported as field violations instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRequest {
    #[serde(rename = "type")]
    pub contribution_type: Option<Value>,
    pub proposed_payload: Option<Value>,
    pub contributor_email: Option<String>,
    pub contributor_name: Option<String>,
    pub notes: Option<String>,
    /// Hidden form field; humans leave it empty.
    pub honeypot: Option<String>,
}

impl SubmissionRequest {
    /// True when the hidden honeypot field holds any text at all,
    /// whitespace included.
    pub fn is_honeypot_triggered(&self) -> bool {
        self.honeypot.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Contributor metadata after normalization, checked with `validator` rules.
#[derive(Debug, Validate)]
struct ContributorFields {
    #[validate(email(message = "Must be a valid email address"))]
    contributor_email: Option<String>,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Must be between 1 and 200 characters"
    ))]
    contributor_name: Option<String>,
    #[validate(length(max = 2000, message = "Must be at most 2000 characters"))]
    notes: Option<String>,
}

/// Validate a raw submission.
///
/// Returns the normalized contribution on success, or every violation found
/// (sorted by field name) on failure.
pub fn validate_submission(
    request: SubmissionRequest,
) -> Result<NewContribution, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    let contribution_type = match request.contribution_type {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new("type", "required", "Type is required"));
            None
        }
        Some(Value::String(tag)) => match tag.parse::<ContributionType>() {
            Ok(t) => Some(t),
            Err(_) => {
                violations.push(FieldViolation::new(
                    "type",
                    "enum",
                    format!(
                        "Unknown contribution type '{tag}'. Must be one of: {}",
                        ContributionType::accepted_values()
                    ),
                ));
                None
            }
        },
        Some(_) => {
            violations.push(FieldViolation::new("type", "type", "Type must be a string"));
            None
        }
    };

    let proposed_payload = match request.proposed_payload {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(
                "proposed_payload",
                "required",
                "Proposed payload is required",
            ));
            None
        }
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            violations.push(FieldViolation::new(
                "proposed_payload",
                "type",
                "Proposed payload must be an object",
            ));
            None
        }
    };

    if let (Some(t), Some(payload)) = (contribution_type, proposed_payload.as_ref()) {
        violations.extend(check_update_shape(t, payload));
    }

    let contributor = ContributorFields {
        contributor_email: normalize_optional(request.contributor_email),
        contributor_name: normalize_optional(request.contributor_name),
        notes: normalize_optional(request.notes),
    };
    if let Err(errors) = contributor.validate() {
        violations.extend(violations_from(&errors));
    }

    violations.sort_by(|a, b| a.field.cmp(&b.field));

    match (contribution_type, proposed_payload) {
        (Some(contribution_type), Some(proposed_payload)) if violations.is_empty() => {
            Ok(NewContribution {
                contribution_type,
                proposed_payload,
                contributor_email: contributor.contributor_email,
                contributor_name: contributor.contributor_name,
                notes: contributor.notes,
            })
        }
        _ => Err(violations),
    }
}

/// `update_*` payloads must name the row to update and change something.
fn check_update_shape(
    contribution_type: ContributionType,
    payload: &serde_json::Map<String, Value>,
) -> Vec<FieldViolation> {
    let (entity, mode) = contribution_type.target();
    if mode != WriteMode::Update {
        return Vec::new();
    }

    let key = entity.key_field();
    let field = format!("proposed_payload.{key}");
    let mut violations = Vec::new();

    match payload.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::Number(_)) => {}
        _ => violations.push(FieldViolation::new(
            &field,
            "required",
            format!("'{key}' is required to identify the {contribution_type} target"),
        )),
    }

    if !payload.keys().any(|k| k != key) {
        violations.push(FieldViolation::new(
            "proposed_payload",
            "min_fields",
            format!("An update must change at least one field besides '{key}'"),
        ));
    }

    violations
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn violations_from(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            out.push(FieldViolation::new(&field.to_string(), &err.code, message));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> SubmissionRequest {
        serde_json::from_value(body).expect("request body should deserialize")
    }

    fn fields(violations: &[FieldViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_new_country_accepted() {
        let new = validate_submission(request(json!({
            "type": "new_country",
            "proposed_payload": {"slug": "xy", "name_fr": "Pays X", "region_id": "r1", "population_2025": 1000},
            "contributor_email": "ama@example.org",
            "contributor_name": "Ama",
        })))
        .unwrap();

        assert_eq!(new.contribution_type, ContributionType::NewCountry);
        assert_eq!(new.proposed_payload["slug"], "xy");
        assert_eq!(new.contributor_email.as_deref(), Some("ama@example.org"));
    }

    #[test]
    fn test_unknown_type_reports_type_field() {
        let violations = validate_submission(request(json!({
            "type": "delete_country",
            "proposed_payload": {"slug": "xy"},
        })))
        .unwrap_err();

        assert_eq!(fields(&violations), vec!["type"]);
        assert_eq!(violations[0].rule, "enum");
    }

    #[test]
    fn test_missing_type_and_payload_both_reported() {
        let violations = validate_submission(request(json!({}))).unwrap_err();
        assert_eq!(fields(&violations), vec!["proposed_payload", "type"]);
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let violations = validate_submission(request(json!({
            "type": "new_region",
            "proposed_payload": ["code", "x"],
        })))
        .unwrap_err();
        assert_eq!(violations[0].field, "proposed_payload");
        assert_eq!(violations[0].rule, "type");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let violations = validate_submission(request(json!({
            "type": "new_region",
            "proposed_payload": {"code": "x", "name_fr": "X"},
            "contributor_email": "not-an-email",
        })))
        .unwrap_err();
        assert_eq!(fields(&violations), vec!["contributor_email"]);
    }

    #[test]
    fn test_empty_optional_fields_normalized_to_absent() {
        let new = validate_submission(request(json!({
            "type": "new_region",
            "proposed_payload": {"code": "x", "name_fr": "X"},
            "contributor_email": "",
            "contributor_name": "   ",
            "notes": null,
        })))
        .unwrap();
        assert_eq!(new.contributor_email, None);
        assert_eq!(new.contributor_name, None);
        assert_eq!(new.notes, None);
    }

    #[test]
    fn test_name_over_limit_rejected() {
        let violations = validate_submission(request(json!({
            "type": "new_region",
            "proposed_payload": {"code": "x"},
            "contributor_name": "a".repeat(201),
        })))
        .unwrap_err();
        assert_eq!(fields(&violations), vec!["contributor_name"]);
    }

    #[test]
    fn test_name_length_counts_characters_not_bytes() {
        let new = validate_submission(request(json!({
            "type": "new_region",
            "proposed_payload": {"code": "x"},
            "contributor_name": "é".repeat(200),
        })));
        assert!(new.is_ok());
    }

    #[test]
    fn test_notes_over_limit_rejected() {
        let violations = validate_submission(request(json!({
            "type": "new_region",
            "proposed_payload": {"code": "x"},
            "notes": "n".repeat(2001),
        })))
        .unwrap_err();
        assert_eq!(fields(&violations), vec!["notes"]);
    }

    #[test]
    fn test_update_without_key_rejected() {
        let violations = validate_submission(request(json!({
            "type": "update_region",
            "proposed_payload": {"total_population": 999},
        })))
        .unwrap_err();
        assert_eq!(fields(&violations), vec!["proposed_payload.code"]);
    }

    #[test]
    fn test_update_with_only_key_rejected() {
        let violations = validate_submission(request(json!({
            "type": "update_country",
            "proposed_payload": {"slug": "xy"},
        })))
        .unwrap_err();
        assert_eq!(violations[0].rule, "min_fields");
    }

    #[test]
    fn test_update_presence_accepts_numeric_id() {
        let new = validate_submission(request(json!({
            "type": "update_presence",
            "proposed_payload": {"id": 42, "population": 1200},
        })));
        assert!(new.is_ok());
    }

    #[test]
    fn test_honeypot_detection() {
        let mut req = request(json!({"type": "new_region", "proposed_payload": {}}));
        assert!(!req.is_honeypot_triggered());
        req.honeypot = Some(String::new());
        assert!(!req.is_honeypot_triggered());
        req.honeypot = Some("  ".into());
        assert!(req.is_honeypot_triggered());
        req.honeypot = Some("http://spam.example".into());
        assert!(req.is_honeypot_triggered());
    }
}
