//! Structured record envelope

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded packet: a `type` discriminator plus a free-form `params` payload.
///
/// The codec on either side of the connection produces and consumes these;
/// nothing below this layer knows about framing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Correlation id, present on packets the node originates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,

    /// Packet type, e.g. "register" or "registered"
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific payload
    #[serde(default)]
    pub params: Value,
}

impl Record {
    /// Build a record from typed params
    pub fn new<P: Serialize>(kind: &str, params: &P) -> serde_json::Result<Self> {
        Ok(Self {
            pid: None,
            kind: kind.to_string(),
            params: serde_json::to_value(params)?,
        })
    }

    /// Attach a correlation id
    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    /// Check the record type
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Decode the params payload into a typed value
    pub fn params_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_params_default_to_null() {
        let record: Record = serde_json::from_value(json!({"type": "ping"})).unwrap();
        assert!(record.is("ping"));
        assert_eq!(record.pid, None);
        assert_eq!(record.params, Value::Null);
    }

    #[test]
    fn test_pid_omitted_when_absent() {
        let record = Record::new("subscribe", &json!({"ip": "10.0.0.5"})).unwrap();
        let encoded = serde_json::to_value(&record).unwrap();
        assert!(encoded.get("pid").is_none());
        assert_eq!(encoded["type"], "subscribe");

        let encoded = serde_json::to_value(record.with_pid("ab12")).unwrap();
        assert_eq!(encoded["pid"], "ab12");
    }
}
