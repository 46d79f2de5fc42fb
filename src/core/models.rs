use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of the route: either the scalar travel duration in
/// traffic, or the full parsed API response when `store_json` is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampleValue {
    /// Travel duration in traffic, seconds.
    Duration(f64),
    /// Entire parsed response body.
    Payload(serde_json::Value),
}

impl SampleValue {
    #[allow(dead_code)]
    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            SampleValue::Duration(secs) => Some(*secs),
            SampleValue::Payload(_) => None,
        }
    }
}

/// A single (timestamp, value) data point. Immutable once created;
/// insertion order in the store is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: SampleValue,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: SampleValue) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_secs_accessor() {
        let duration = SampleValue::Duration(42.0);
        assert_eq!(duration.duration_secs(), Some(42.0));

        let payload = SampleValue::Payload(serde_json::json!({"resourceSets": []}));
        assert_eq!(payload.duration_secs(), None);
    }

    #[test]
    fn test_sample_serde_round_trip() {
        let sample = Sample::new(Utc::now(), SampleValue::Duration(617.5));

        let encoded = serde_json::to_string(&sample).unwrap();
        let decoded: Sample = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, sample);
    }

    #[test]
    fn test_payload_sample_round_trip_keeps_structure() {
        let body = serde_json::json!({
            "resourceSets": [{"resources": [{"travelDurationTraffic": 42}]}]
        });
        let sample = Sample::new(Utc::now(), SampleValue::Payload(body.clone()));

        let encoded = serde_json::to_string(&sample).unwrap();
        let decoded: Sample = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.value, SampleValue::Payload(body));
    }
}
