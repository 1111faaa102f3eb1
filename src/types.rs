use std::ops::Deref;

use serde_json::Value as JsonValue;

/// Decoded body of a successful response.
///
/// Always a JSON object or array; scalar and empty bodies are rejected as
/// malformed before a `RawResult` is built. The shape below the top level is
/// endpoint-specific and left to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResult(JsonValue);

impl RawResult {
    /// Wraps a decoded value, returning it back if it is not a container.
    pub fn from_json(value: JsonValue) -> Result<Self, JsonValue> {
        if value.is_object() || value.is_array() {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_json(self) -> JsonValue {
        self.0
    }

    /// Deserializes the container into a caller-defined shape.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(self.0)
    }
}

impl Deref for RawResult {
    type Target = JsonValue;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<JsonValue> for RawResult {
    fn eq(&self, other: &JsonValue) -> bool {
        self.0 == *other
    }
}

impl From<RawResult> for JsonValue {
    fn from(result: RawResult) -> Self {
        result.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::RawResult;

    #[test]
    fn accepts_only_containers() {
        assert!(RawResult::from_json(json!({"credits_remaining": 1000})).is_ok());
        assert!(RawResult::from_json(json!([1, 2, 3])).is_ok());
        assert_eq!(RawResult::from_json(json!("ok")), Err(json!("ok")));
        assert_eq!(RawResult::from_json(json!(null)), Err(json!(null)));
    }

    #[test]
    fn decodes_into_caller_shape() {
        #[derive(serde::Deserialize)]
        struct Credits {
            credits_remaining: u64,
        }

        let result = RawResult::from_json(json!({"credits_remaining": 1000})).expect("object");
        assert_eq!(result["credits_remaining"], 1000);
        let credits: Credits = result.decode().expect("shape matches");
        assert_eq!(credits.credits_remaining, 1000);
    }
}
