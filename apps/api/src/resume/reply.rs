//! Interpretation of the model's raw text reply.
//!
//! The reply is parsed into a loose JSON value first and only then checked
//! for the three expected keys, so any deviation lands in `Unusable` rather
//! than a deserialization error.

use serde_json::{Map, Value};

use crate::llm_client::strip_json_fences;
use crate::models::candidate::CandidateFields;

const FIELD_KEYS: [&str; 3] = ["full_name", "email", "phone"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// All three keys present, each a string or null.
    Fields(CandidateFields),
    /// The model answered with an explicit `{"error": ...}` object.
    Reported(String),
    /// Anything else; carries the reason for logging.
    Unusable(String),
}

pub fn interpret_reply(raw: &str) -> ModelReply {
    let text = strip_json_fences(raw);
    if text.is_empty() {
        return ModelReply::Unusable("empty reply".to_string());
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return ModelReply::Unusable(format!("not valid JSON: {e}")),
    };

    let Value::Object(object) = value else {
        return ModelReply::Unusable("reply is not a JSON object".to_string());
    };

    if let Some(error) = object.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return ModelReply::Reported(message);
    }

    match fields_from_object(&object) {
        Ok(fields) => ModelReply::Fields(fields),
        Err(reason) => ModelReply::Unusable(reason),
    }
}

fn fields_from_object(object: &Map<String, Value>) -> Result<CandidateFields, String> {
    let [full_name, email, phone] = FIELD_KEYS.map(|key| field(object, key));
    Ok(CandidateFields {
        full_name: full_name?,
        email: email?,
        phone: phone?,
    })
}

fn field(object: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match object.get(key) {
        None => Err(format!("missing key '{key}'")),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(other) => Err(format!("key '{key}' has unexpected type: {other}")),
    }
}
