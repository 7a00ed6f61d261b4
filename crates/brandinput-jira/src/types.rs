//! Response shapes for the Jira REST v2 endpoints the client uses, and their
//! conversion into [`Ticket`].

use brandinput_core::{FieldIds, Ticket};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<RawIssue>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    pub key: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawIssue {
    /// Maps the raw field bag onto a [`Ticket`] using the configured field ids.
    #[must_use]
    pub fn into_ticket(self, ids: &FieldIds) -> Ticket {
        let fields = &self.fields;
        Ticket {
            reporter: fields.get("reporter").and_then(user_display_name),
            status: fields
                .get("status")
                .and_then(|s| s.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            advertiser: fields.get(&ids.advertiser).and_then(text_value),
            study_reference: fields.get(&ids.study_reference).and_then(text_value),
            media_partner: fields.get(&ids.media_partner).and_then(text_value),
            account_id: fields.get(&ids.account_id).and_then(integer_value),
            lead_analyst: fields.get(&ids.lead_analyst).and_then(user_name),
            key: self.key,
        }
    }
}

/// Plain string, or a select-list option `{"value": ...}`.
fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("value").and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Number fields arrive as JSON floats (`501.0`); text fields as strings.
#[allow(clippy::cast_possible_truncation)]
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn user_display_name(value: &Value) -> Option<String> {
    value
        .get("displayName")
        .or_else(|| value.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn user_name(value: &Value) -> Option<String> {
    value
        .get("name")
        .or_else(|| value.get("displayName"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
