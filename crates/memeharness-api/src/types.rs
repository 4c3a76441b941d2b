//! DTOs for the meme service.

use serde::{Deserialize, Serialize};

/// A meme record as returned by the service.
///
/// `tags` and `info` stay untyped: the service accepts heterogeneous tag
/// lists and free-form info objects, and the negative suite sends shapes a
/// typed field would reject.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Meme {
    pub id: i64,
    pub text: String,
    pub url: String,
    pub tags: serde_json::Value,
    pub info: serde_json::Value,
    pub updated_by: String,
}

/// Canonical valid payload for create/update requests.
#[derive(Debug, Clone, Serialize)]
pub struct MemePayload {
    /// Present only on update; the service rejects a URL/body id mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub text: String,
    pub url: String,
    pub tags: serde_json::Value,
    pub info: serde_json::Value,
}

impl MemePayload {
    /// A well-formed create payload.
    pub fn sample() -> Self {
        Self {
            id: None,
            text: "Test meme text".into(),
            url: "https://example.com/meme.jpg".into(),
            tags: serde_json::json!(["funny", "test"]),
            info: serde_json::json!({"colors": ["red", "blue"], "objects": ["text", "image"]}),
        }
    }

    /// Attach the record id for update requests.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Body for `POST /authorize`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    pub name: String,
}

impl AuthPayload {
    /// Payload for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_payload_has_all_required_fields() {
        let value = MemePayload::sample().to_value();
        for field in ["text", "url", "tags", "info"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert!(value.get("id").is_none(), "create payload must not carry id");
    }

    #[test]
    fn update_payload_carries_id() {
        let value = MemePayload::sample().with_id(42).to_value();
        assert_eq!(value["id"], 42);
    }

    #[test]
    fn meme_deserializes_from_contract_shape() {
        let meme: Meme = serde_json::from_value(serde_json::json!({
            "id": 7,
            "text": "hello",
            "url": "https://example.com/m.jpg",
            "tags": ["a", 1, true],
            "info": {"k": "v"},
            "updated_by": "test_user"
        }))
        .unwrap();
        assert_eq!(meme.id, 7);
        assert_eq!(meme.updated_by, "test_user");
    }
}
