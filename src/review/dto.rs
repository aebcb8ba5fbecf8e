use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::review::repo::ReviewRecord;

/// Request body for a review. The session token travels in the body on this
/// endpoint (legacy wire contract kept for the existing SPA client).
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub code: String,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review: String,
    pub fixed_code: String,
    pub score: i32,
    pub usage_count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub code_snippet: String,
    pub review: String,
    pub score: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ReviewRecord> for HistoryEntry {
    fn from(r: ReviewRecord) -> Self {
        Self {
            code_snippet: r.code_snippet,
            review: r.review,
            score: r.score,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_response_uses_camel_case_wire_names() {
        let response = ReviewResponse {
            review: "ok".into(),
            fixed_code: "let x = 1;".into(),
            score: 90,
            usage_count: 1,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("fixedCode").is_some());
        assert!(json.get("usageCount").is_some());
    }

    #[test]
    fn history_entry_serializes_rfc3339_timestamp() {
        let entry = HistoryEntry {
            code_snippet: "x".into(),
            review: "r".into(),
            score: 80,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
        assert!(json.get("codeSnippet").is_some());
    }
}
