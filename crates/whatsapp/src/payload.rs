//! JSON body sent to the gateway.

use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    tracing::debug,
};

/// Outbound request body.
///
/// Named fields cover what the gateway understands for text and file sends;
/// anything else set through [`Payload::insert`] is carried in `extra` and
/// flattened into the same JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attachment section of a file send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    /// Base64-encoded contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Payload {
    /// Value stored under the wire key `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "session" => self.session.clone().map(Value::String),
            "chatId" => self.chat_id.clone().map(Value::String),
            "text" => self.text.clone().map(Value::String),
            "caption" => self.caption.clone().map(Value::String),
            "file" => self
                .file
                .as_ref()
                .and_then(|f| serde_json::to_value(f).ok()),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Set the wire key `key`.
    ///
    /// Known keys go to their typed field and `null` clears them. Numbers and
    /// booleans given for a text field are stored in their JSON form; other
    /// shapes for known keys are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let slot = match key.as_str() {
            "session" => &mut self.session,
            "chatId" => &mut self.chat_id,
            "text" => &mut self.text,
            "caption" => &mut self.caption,
            "file" => {
                self.file = match value {
                    Value::Null => None,
                    other => match serde_json::from_value(other) {
                        Ok(file) => Some(file),
                        Err(e) => {
                            debug!(error = %e, "ignoring malformed file payload");
                            return;
                        },
                    },
                };
                return;
            },
            _ => {
                self.extra.insert(key, value);
                return;
            },
        };

        *slot = match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            scalar @ (Value::Number(_) | Value::Bool(_)) => Some(scalar.to_string()),
            Value::Array(_) | Value::Object(_) => {
                debug!(key = %key, "ignoring non-scalar value for text field");
                return;
            },
        };
    }

    /// Encode as a JSON object.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}
