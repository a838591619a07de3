//! Field-level validation of ticket payloads.
//!
//! Payloads arrive as raw JSON so that type mismatches can be reported per
//! field, rather than as a single deserialization failure.

use serde_json::{Map, Value};

use crate::base::types::{CATEGORIES, NewTicket, PRIORITIES, STATUSES, TITLE_MAX_CHARS, TicketPatch};

use super::error::FieldErrors;

const REQUIRED: &str = "This field is required.";
const READ_ONLY_FIELDS: [&str; 2] = ["id", "created_at"];

/// Validate a create payload; omitted optional fields take their defaults.
pub fn validate_new_ticket(body: &Value) -> Result<NewTicket, FieldErrors> {
    let patch = validate_fields(body, true)?;

    let (Some(title), Some(description)) = (patch.title, patch.description) else {
        return Err(FieldErrors::from([("non_field_errors".to_string(), vec![REQUIRED.to_string()])]));
    };

    let mut ticket = NewTicket::new(title, description);

    if let Some(category) = patch.category {
        ticket.category = category;
    }
    if let Some(priority) = patch.priority {
        ticket.priority = priority;
    }
    if let Some(status) = patch.status {
        ticket.status = status;
    }

    Ok(ticket)
}

/// Validate an update payload.
///
/// With `full` set (a `PUT`), `title` and `description` must be present.
pub fn validate_ticket_patch(body: &Value, full: bool) -> Result<TicketPatch, FieldErrors> {
    validate_fields(body, full)
}

fn validate_fields(body: &Value, require_text: bool) -> Result<TicketPatch, FieldErrors> {
    let Some(object) = body.as_object() else {
        return Err(FieldErrors::from([(
            "non_field_errors".to_string(),
            vec!["Invalid data. Expected a JSON object.".to_string()],
        )]));
    };

    let mut errors = FieldErrors::new();

    for field in READ_ONLY_FIELDS {
        if object.contains_key(field) {
            push(&mut errors, field, "This field is read-only.".to_string());
        }
    }

    let title = text_field(object, "title", require_text, &mut errors);
    let description = text_field(object, "description", require_text, &mut errors);
    let category = choice_field(object, "category", &CATEGORIES, &mut errors);
    let priority = choice_field(object, "priority", &PRIORITIES, &mut errors);
    let status = choice_field(object, "status", &STATUSES, &mut errors);

    if let Some(title) = &title {
        if title.chars().count() > TITLE_MAX_CHARS {
            push(&mut errors, "title", format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(TicketPatch {
        title,
        description,
        category,
        priority,
        status,
    })
}

fn push(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

/// A string field that may not be blank when present.
fn text_field(object: &Map<String, Value>, field: &str, required: bool, errors: &mut FieldErrors) -> Option<String> {
    match object.get(field) {
        None if required => {
            push(errors, field, REQUIRED.to_string());
            None
        }
        None => None,
        Some(Value::String(value)) if value.trim().is_empty() => {
            push(errors, field, "This field may not be blank.".to_string());
            None
        }
        Some(Value::String(value)) => Some(value.clone()),
        Some(Value::Null) => {
            push(errors, field, "This field may not be null.".to_string());
            None
        }
        Some(_) => {
            push(errors, field, "Not a valid string.".to_string());
            None
        }
    }
}

/// A string field restricted to `allowed`.
fn choice_field(object: &Map<String, Value>, field: &str, allowed: &[&str], errors: &mut FieldErrors) -> Option<String> {
    match object.get(field) {
        None => None,
        Some(Value::String(value)) if allowed.contains(&value.as_str()) => Some(value.clone()),
        Some(Value::String(value)) => {
            push(errors, field, format!("\"{value}\" is not a valid choice."));
            None
        }
        Some(Value::Null) => {
            push(errors, field, "This field may not be null.".to_string());
            None
        }
        Some(_) => {
            push(errors, field, "Not a valid string.".to_string());
            None
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_ticket_defaults() {
        let ticket = validate_new_ticket(&json!({ "title": "Refund", "description": "Charged twice" })).unwrap();

        assert_eq!(ticket, NewTicket::new("Refund", "Charged twice"));
        assert_eq!(ticket.status, "open");
    }

    #[test]
    fn test_new_ticket_keeps_supplied_choices() {
        let ticket = validate_new_ticket(&json!({
            "title": "Refund",
            "description": "Charged twice",
            "category": "billing",
            "priority": "high",
            "status": "in_progress",
        }))
        .unwrap();

        assert_eq!(ticket.category, "billing");
        assert_eq!(ticket.priority, "high");
        assert_eq!(ticket.status, "in_progress");
    }

    #[test]
    fn test_new_ticket_missing_required_fields() {
        let errors = validate_new_ticket(&json!({ "category": "billing" })).unwrap_err();

        assert_eq!(errors["title"], vec![REQUIRED.to_string()]);
        assert_eq!(errors["description"], vec![REQUIRED.to_string()]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_blank_and_mistyped_fields() {
        let errors = validate_new_ticket(&json!({ "title": "   ", "description": 42, "priority": "urgent" })).unwrap_err();

        assert_eq!(errors["title"], vec!["This field may not be blank.".to_string()]);
        assert_eq!(errors["description"], vec!["Not a valid string.".to_string()]);
        assert_eq!(errors["priority"], vec!["\"urgent\" is not a valid choice.".to_string()]);
    }

    #[test]
    fn test_title_length_limit() {
        let long_title = "x".repeat(TITLE_MAX_CHARS + 1);
        let errors = validate_new_ticket(&json!({ "title": long_title, "description": "Body" })).unwrap_err();

        assert!(errors.contains_key("title"));
        assert!(validate_new_ticket(&json!({ "title": "x".repeat(TITLE_MAX_CHARS), "description": "Body" })).is_ok());
    }

    #[test]
    fn test_non_object_payload() {
        let errors = validate_new_ticket(&json!(["title"])).unwrap_err();

        assert!(errors.contains_key("non_field_errors"));
    }

    #[test]
    fn test_partial_patch_only_carries_supplied_fields() {
        let patch = validate_ticket_patch(&json!({ "priority": "low", "unknown": true }), false).unwrap();

        assert_eq!(
            patch,
            TicketPatch {
                priority: Some("low".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_full_patch_requires_text_fields() {
        let errors = validate_ticket_patch(&json!({ "status": "closed" }), true).unwrap_err();

        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("description"));
    }

    #[test]
    fn test_read_only_fields_are_rejected() {
        let errors = validate_ticket_patch(&json!({ "id": 7, "created_at": "2026-01-01T00:00:00Z" }), false).unwrap_err();

        assert_eq!(errors["id"], vec!["This field is read-only.".to_string()]);
        assert_eq!(errors["created_at"], vec!["This field is read-only.".to_string()]);
    }
}
