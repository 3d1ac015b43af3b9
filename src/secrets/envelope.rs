//! The secret response envelope returned by logical reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A backend read response: the key/value data plus its lease metadata.
///
/// Field names follow the backend's wire format so the envelope can be handed
/// back to HTTP callers unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub request_id: String,

    #[serde(default)]
    pub lease_id: String,

    #[serde(default)]
    pub lease_duration: u64,

    #[serde(default)]
    pub renewable: bool,

    #[serde(default)]
    pub data: Option<Map<String, Value>>,

    #[serde(default)]
    pub warnings: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_info: Option<Value>,
}

impl Secret {
    /// Build an envelope around `data` with no lease.
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self { data: Some(data), ..Self::default() }
    }

    /// True when the envelope carries at least one key.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_kv_v1_read() {
        let body = json!({
            "request_id": "8f3c",
            "lease_id": "",
            "lease_duration": 2764800,
            "renewable": false,
            "data": {"username": "qms", "password": "hunter2"},
            "wrap_info": null,
            "warnings": null,
            "auth": null
        });
        let secret: Secret = serde_json::from_value(body).unwrap();
        assert!(secret.has_data());
        assert_eq!(secret.lease_duration, 2764800);
        assert_eq!(secret.data.unwrap()["username"], "qms");
    }

    #[test]
    fn test_empty_or_missing_data_has_no_data() {
        let empty: Secret = serde_json::from_value(json!({"data": {}})).unwrap();
        assert!(!empty.has_data());

        let missing: Secret = serde_json::from_value(json!({"request_id": "x"})).unwrap();
        assert!(!missing.has_data());
    }

    #[test]
    fn test_serializes_envelope_fields() {
        let mut data = Map::new();
        data.insert("k".to_string(), json!("v"));
        let body = serde_json::to_value(Secret::with_data(data)).unwrap();

        assert_eq!(body["data"], json!({"k": "v"}));
        assert_eq!(body["lease_duration"], 0);
        assert!(body.get("auth").is_none());
        assert!(body.get("warnings").is_some());
    }
}
