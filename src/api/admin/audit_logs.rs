//! Audit trail admin endpoint

use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::middleware::RequireAdmin;
use crate::api::portal::keys::parse_key_id;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::audit::{AuditAction, AuditLogView, AuditQuery};
use crate::domain::page::{Page, PageRequest};

/// Filters for the audit listing. Time bounds are RFC 3339 and inclusive.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogParams {
    pub action: Option<String>,
    pub actor_email: Option<String>,
    pub api_key_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl AuditLogParams {
    fn into_query(self) -> Result<AuditQuery, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::bad_request("'from' must not be after 'to'").with_param("from"));
            }
        }

        let mut query = AuditQuery::new()
            .with_range(self.from, self.to)
            .with_page(PageRequest::new(self.page, self.page_size));

        if let Some(action) = self.action.filter(|a| !a.trim().is_empty()) {
            query = query.with_action(action.parse::<AuditAction>()?);
        }

        if let Some(email) = self.actor_email {
            query = query.with_actor_email(email);
        }

        if let Some(api_key_id) = self.api_key_id.filter(|id| !id.trim().is_empty()) {
            query = query.with_api_key(parse_key_id(&api_key_id)?);
        }

        Ok(query)
    }
}

/// GET /admin/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<AuditLogParams>,
) -> Result<Json<Page<AuditLogView>>, ApiError> {
    let query = params.into_query()?;
    let page = state.audit.query(&query).await?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_params_build_query() {
        let params = AuditLogParams {
            action: Some("revoke_key".to_string()),
            actor_email: Some("admin".to_string()),
            page: Some(2),
            page_size: Some(500),
            ..Default::default()
        };

        let query = params.into_query().unwrap();
        assert_eq!(query.action, Some(AuditAction::RevokeKey));
        assert_eq!(query.actor_email.as_deref(), Some("admin"));
        assert_eq!(query.page.page(), 2);
        assert_eq!(query.page.page_size(), 100);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let params = AuditLogParams {
            action: Some("DELETE_EVERYTHING".to_string()),
            ..Default::default()
        };

        let err = params.into_query().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("action"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let now = Utc::now();
        let params = AuditLogParams {
            from: Some(now),
            to: Some(now - chrono::Duration::days(1)),
            ..Default::default()
        };

        assert!(params.into_query().is_err());
    }
}
