use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One Client-Side Monitoring message as emitted by an AWS SDK.
///
/// Field names follow the CSM wire keys. Keys missing from a payload (or sent
/// as `null`) decode to the zero value of the field; keys this struct does not
/// know about are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Event {
    #[serde(deserialize_with = "nullable")]
    pub api: String,
    #[serde(rename = "Type", deserialize_with = "nullable")]
    pub event_type: String,
    #[serde(deserialize_with = "nullable")]
    pub region: String,
    #[serde(deserialize_with = "nullable")]
    pub service: String,
    #[serde(deserialize_with = "nullable")]
    pub access_key: String,
    #[serde(deserialize_with = "nullable")]
    pub user_agent: String,
    #[serde(rename = "XAmznRequestId", deserialize_with = "nullable")]
    pub request_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(deserialize_with = "nullable")]
    pub timestamp: i64,
    #[serde(rename = "AttemptCount", deserialize_with = "nullable")]
    pub attempts: i64,
    /// Milliseconds.
    #[serde(deserialize_with = "nullable")]
    pub latency: i64,
    #[serde(deserialize_with = "nullable")]
    pub version: i64,
    #[serde(deserialize_with = "nullable")]
    pub http_status_code: i64,
    #[serde(deserialize_with = "nullable")]
    pub final_http_status_code: i64,
    /// 0 or 1.
    #[serde(deserialize_with = "nullable")]
    pub max_retries_exceeded: i64,
}

impl Event {
    /// Event time as a UTC date, `None` if the timestamp is out of range.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
