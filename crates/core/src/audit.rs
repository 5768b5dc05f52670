//! Audit action names and payload redaction.
//!
//! Lives in `core` so that both the services in `copejem-db` and the event
//! bus in `copejem-events` agree on action names.

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit events.
pub mod action_types {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const ENTITY_CREATE: &str = "entity_create";
    pub const ENTITY_UPDATE: &str = "entity_update";
    pub const ENTITY_DELETE: &str = "entity_delete";
    /// An update applied to a project from a previous year.
    pub const HISTORICAL_UPDATE: &str = "historical_update";
    /// A delete refused by the historical immutability rule.
    pub const HISTORICAL_DELETE_REJECTED: &str = "historical_delete_rejected";
}

// ---------------------------------------------------------------------------
// Log category constants
// ---------------------------------------------------------------------------

/// Categories used to group audit events.
pub mod log_categories {
    pub const AUTHENTICATION: &str = "authentication";
    pub const OPERATIONS: &str = "operations";
    pub const INSTITUTIONAL_RECORD: &str = "institutional_record";
}

/// Map an action type to its log category.
///
/// Unknown action types default to `"operations"`.
pub fn action_to_category(action_type: &str) -> &'static str {
    match action_type {
        action_types::LOGIN | action_types::LOGOUT => log_categories::AUTHENTICATION,
        action_types::HISTORICAL_UPDATE | action_types::HISTORICAL_DELETE_REJECTED => {
            log_categories::INSTITUTIONAL_RECORD
        }
        _ => log_categories::OPERATIONS,
    }
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Keys whose values never appear in audit payloads.
pub const SENSITIVE_FIELDS: &[&str] = &["password", "secret", "token", "credential"];

/// Redact sensitive fields from a JSON value, recursively.
///
/// Replaces the value of any key containing one of [`SENSITIVE_FIELDS`]
/// (case-insensitive) with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn login_is_authentication() {
        assert_eq!(action_to_category(action_types::LOGIN), "authentication");
    }

    #[test]
    fn historical_actions_share_a_category() {
        assert_eq!(
            action_to_category(action_types::HISTORICAL_UPDATE),
            action_to_category(action_types::HISTORICAL_DELETE_REJECTED)
        );
    }

    #[test]
    fn unknown_action_is_operations() {
        assert_eq!(action_to_category("whatever"), "operations");
    }

    #[test]
    fn password_is_redacted_at_any_depth() {
        let value = json!({
            "name": "Ana",
            "Password": "s1",
            "nested": [{"secretAnswer": "x", "ok": 1}]
        });
        let out = redact_sensitive_fields(&value);
        assert_eq!(out["name"], "Ana");
        assert_eq!(out["Password"], "[REDACTED]");
        assert_eq!(out["nested"][0]["secretAnswer"], "[REDACTED]");
        assert_eq!(out["nested"][0]["ok"], 1);
    }
}
