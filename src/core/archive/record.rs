use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::error::ArchiveResult;

/// One fetch: the exact request parameters plus the raw response payload.
///
/// This is what `latest.json` and `v<version>.json` hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "req")]
    pub request: Value,
    #[serde(rename = "rsp")]
    pub response: Value,
}

impl Observation {
    pub fn new(request: impl Serialize, response: Value) -> ArchiveResult<Self> {
        Ok(Self {
            request: serde_json::to_value(request)?,
            response,
        })
    }

    /// `{req, rsp}` as a single tree, the shape the differ compares.
    pub fn to_value(&self) -> Value {
        json!({ "req": self.request, "rsp": self.response })
    }
}

/// A history entry. Never mutated once appended to an `all.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "updatedAt")]
    pub recorded_at: String,
    #[serde(rename = "req")]
    pub request: Value,
    #[serde(rename = "rsp")]
    pub response: Value,
}

impl StoredRecord {
    /// Stamp an observation with the current time.
    pub fn recorded_now(observation: &Observation) -> Self {
        Self {
            recorded_at: now_timestamp(),
            request: observation.request.clone(),
            response: observation.response.clone(),
        }
    }

    /// The `(req, rsp)` pair without the timestamp.
    pub fn observation_value(&self) -> Value {
        json!({ "req": self.request, "rsp": self.response })
    }

    /// Response field as a string, e.g. `version`.
    pub fn response_str(&self, key: &str) -> Option<&str> {
        self.response.get(key).and_then(Value::as_str)
    }
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_record_uses_archive_key_names() {
        let obs = Observation::new(json!({"appCode": "a"}), json!({"version": "1.0.0"})).unwrap();
        let rec = StoredRecord::recorded_now(&obs);
        let value = serde_json::to_value(&rec).unwrap();
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["req"]["appCode"], "a");
        assert_eq!(rec.response_str("version"), Some("1.0.0"));
    }

    #[test]
    fn reads_records_written_by_older_runs() {
        let raw = r#"[{"updatedAt": "2025-11-01T10:00:00.000+09:00", "req": {"channel": 6}, "rsp": {"version": "0.9.1"}}]"#;
        let records: Vec<StoredRecord> = serde_json::from_str(raw).unwrap();
        assert_eq!(records[0].recorded_at, "2025-11-01T10:00:00.000+09:00");
        assert_eq!(records[0].observation_value(), json!({"req": {"channel": 6}, "rsp": {"version": "0.9.1"}}));
    }
}
