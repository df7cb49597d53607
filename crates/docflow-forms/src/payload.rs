//! Webhook payload

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::DocumentType;
use crate::ordered::OrderedMap;

/// Body POSTed to the webhook
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub token: String,
    /// Submission instant, ISO-8601 UTC with milliseconds
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub common: OrderedMap<String>,
    pub documents: Vec<DocumentSubmission>,
}

/// One selected document type and its captured input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentSubmission {
    /// Document type key
    #[serde(rename = "type")]
    pub doc_type: String,
    pub name: String,
    /// Snapshot of the document type configuration
    pub config: DocumentType,
    pub data: OrderedMap<String>,
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl SubmissionPayload {
    pub fn new(
        token: impl Into<String>,
        timestamp: DateTime<Utc>,
        common: OrderedMap<String>,
        documents: Vec<DocumentSubmission>,
    ) -> Self {
        Self { token: token.into(), timestamp, common, documents }
    }

    pub fn document_names(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable payload: {}>", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Field;
    use chrono::TimeZone;

    #[test]
    fn test_wire_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 1, 2, 3).unwrap();
        let payload = SubmissionPayload::new(
            "tok",
            ts,
            [("common-date", "2024年3月5日".to_string())].into_iter().collect(),
            vec![DocumentSubmission {
                doc_type: "contract".into(),
                name: "契約書".into(),
                config: DocumentType::new("契約書", "contract-form").with_field(Field::text("amount", "金額")),
                data: [("amount", "100".to_string())].into_iter().collect(),
            }],
        );

        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["token"], "tok");
        assert_eq!(json["timestamp"], "2024-03-05T01:02:03.000Z");
        assert_eq!(json["documents"][0]["type"], "contract");
        assert_eq!(json["documents"][0]["config"]["formId"], "contract-form");
        assert_eq!(json["documents"][0]["data"]["amount"], "100");
        assert_eq!(payload.document_names(), vec!["契約書"]);
    }
}
