use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::admin::repo::AccountOverview;
use crate::auth::repo_types::{Role, Subscription};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserEntry {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub subscription: Subscription,
    pub usage_count: i32,
    pub audit_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<AccountOverview> for AdminUserEntry {
    fn from(a: AccountOverview) -> Self {
        Self {
            id: a.id,
            email: a.email,
            role: a.role,
            subscription: a.subscription,
            usage_count: a.usage_count,
            audit_count: a.audit_count,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_audits: i64,
    pub users: Vec<AdminUserEntry>,
}

/// Patch body for account updates. Only the two enumerated fields are
/// accepted; anything else is rejected at deserialization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub role: Option<Role>,
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_rejects_unknown_fields() {
        let err = serde_json::from_str::<UpdateUserRequest>(r#"{"isAdmin": true}"#).unwrap_err();
        assert!(err.to_string().contains("isAdmin"));
    }

    #[test]
    fn update_request_rejects_invalid_enum_value() {
        assert!(serde_json::from_str::<UpdateUserRequest>(r#"{"role": "root"}"#).is_err());
        assert!(
            serde_json::from_str::<UpdateUserRequest>(r#"{"subscription": "platinum"}"#).is_err()
        );
    }

    #[test]
    fn update_request_accepts_partial_fields() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
        assert_eq!(req.role, Some(Role::Admin));
        assert_eq!(req.subscription, None);
    }

    #[test]
    fn stats_response_uses_camel_case_wire_names() {
        let response = StatsResponse {
            total_users: 1,
            total_audits: 4,
            users: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalUsers"], 1);
        assert_eq!(json["totalAudits"], 4);
    }
}
