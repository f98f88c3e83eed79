//! resource rule endpoints for api v1.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::handlers::{ApiError, JsonBody};
use rampart_rules::{RuleSpec, RuleUpdate};
use rampart_types::{IpSetId, ResourceId, ResourceRule, RuleAction, RuleId, RuleMatch, RuleMatchInput};

use super::empty_string_as_none;
use super::resources::PaginationParams;

/// response wrapper for list rules endpoint.
#[derive(Debug, Serialize)]
pub struct ListRulesResponse {
    pub rules: Vec<RuleResponse>,
}

/// resource rule representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleResponse {
    pub id: String,
    pub resource_id: String,
    pub action: RuleAction,
    #[serde(rename = "match")]
    pub match_kind: RuleMatch,
    pub value: String,
    pub priority: i64,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_set_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_rule_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ResourceRule> for RuleResponse {
    fn from(rule: ResourceRule) -> Self {
        Self {
            id: rule.id.to_string(),
            resource_id: rule.resource_id.to_string(),
            action: rule.action,
            match_kind: rule.match_kind,
            value: rule.value,
            priority: rule.priority,
            enabled: rule.enabled,
            ip_set_id: rule.ip_set_id.map(|id| id.to_string()),
            template_rule_id: rule.template_rule_id.map(|id| id.to_string()),
            created_at: rule.created_at.to_rfc3339(),
            updated_at: rule.updated_at.to_rfc3339(),
        }
    }
}

/// request body for adding a rule to a resource.
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub action: RuleAction,
    #[serde(rename = "match")]
    pub match_kind: RuleMatchInput,
    pub value: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ip_set_id: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// request body for updating a rule. absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    #[serde(default)]
    pub action: Option<RuleAction>,
    #[serde(default, rename = "match")]
    pub match_kind: Option<RuleMatchInput>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ip_set_id: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// response for create rule endpoint.
#[derive(Debug, Serialize)]
pub struct CreateRuleResponse {
    pub rule: RuleResponse,
}

/// response for update rule endpoint.
#[derive(Debug, Serialize)]
pub struct UpdateRuleResponse {
    pub rule: RuleResponse,
}

/// response for delete rule endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteRuleResponse {}

/// create the resource rules router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rules).post(create_rule))
        .route("/{rule_id}", axum::routing::put(update_rule).delete(delete_rule))
}

/// list a resource's rules in evaluation order.
///
/// `GET /api/v1/resources/{resource_id}/rules`
///
/// supports optional pagination: `?limit=100&offset=0`
async fn list_rules(
    State(state): State<AppState>,
    Path(resource_id): Path<u64>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ListRulesResponse>, ApiError> {
    let rules = state
        .engine
        .list_resource_rules(ResourceId(resource_id))
        .await?;

    debug!(resource_id, count = rules.len(), "listing resource rules");
    let rules: Vec<RuleResponse> = pagination
        .apply(rules)
        .into_iter()
        .map(RuleResponse::from)
        .collect();

    Ok(Json(ListRulesResponse { rules }))
}

/// add a rule to a resource.
///
/// `POST /api/v1/resources/{resource_id}/rules`
///
/// the submitted match kind may be `IP_CIDR`, in which case the server
/// classifies the value as an address or a network before storing it.
async fn create_rule(
    State(state): State<AppState>,
    Path(resource_id): Path<u64>,
    JsonBody(req): JsonBody<CreateRuleRequest>,
) -> Result<(StatusCode, Json<CreateRuleResponse>), ApiError> {
    let spec = RuleSpec {
        action: req.action,
        match_kind: req.match_kind,
        value: req.value,
        ip_set_id: req.ip_set_id.map(IpSetId::from),
        priority: req.priority,
        enabled: req.enabled,
    };
    let rule = state
        .engine
        .create_resource_rule(ResourceId(resource_id), spec)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRuleResponse {
            rule: RuleResponse::from(rule),
        }),
    ))
}

/// update one or more fields of a rule.
///
/// `PUT /api/v1/resources/{resource_id}/rules/{rule_id}`
async fn update_rule(
    State(state): State<AppState>,
    Path((resource_id, rule_id)): Path<(u64, u64)>,
    JsonBody(req): JsonBody<UpdateRuleRequest>,
) -> Result<Json<UpdateRuleResponse>, ApiError> {
    let update = RuleUpdate {
        action: req.action,
        match_kind: req.match_kind,
        value: req.value,
        ip_set_id: req.ip_set_id.map(IpSetId::from),
        priority: req.priority,
        enabled: req.enabled,
    };
    let rule = state
        .engine
        .update_resource_rule(ResourceId(resource_id), RuleId(rule_id), update)
        .await?;

    Ok(Json(UpdateRuleResponse {
        rule: RuleResponse::from(rule),
    }))
}

/// delete a rule from a resource.
///
/// `DELETE /api/v1/resources/{resource_id}/rules/{rule_id}`
///
/// deleting a template-linked copy is a local override; the template
/// and other assigned resources are unaffected.
async fn delete_rule(
    State(state): State<AppState>,
    Path((resource_id, rule_id)): Path<(u64, u64)>,
) -> Result<Json<DeleteRuleResponse>, ApiError> {
    state
        .engine
        .delete_resource_rule(ResourceId(resource_id), RuleId(rule_id))
        .await?;

    Ok(Json(DeleteRuleResponse {}))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rampart_types::TemplateRuleId;

    use super::*;

    fn sample_rule() -> ResourceRule {
        let now = Utc::now();
        ResourceRule {
            id: RuleId(3),
            resource_id: ResourceId(1),
            action: RuleAction::Accept,
            match_kind: RuleMatch::Cidr,
            value: "10.0.0.0/8".to_string(),
            priority: 1,
            enabled: true,
            ip_set_id: None,
            template_rule_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rule_response_omits_absent_links() {
        let response = RuleResponse::from(sample_rule());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], "3");
        assert_eq!(json["match"], "CIDR");
        assert_eq!(json["action"], "ACCEPT");
        assert!(json.get("ip_set_id").is_none());
        assert!(json.get("template_rule_id").is_none());
    }

    #[test]
    fn test_rule_response_includes_template_link() {
        let mut rule = sample_rule();
        rule.template_rule_id = Some(TemplateRuleId(9));
        let json = serde_json::to_value(RuleResponse::from(rule)).unwrap();

        assert_eq!(json["template_rule_id"], "9");
    }

    #[test]
    fn test_create_request_accepts_ip_cidr_kind() {
        let req: CreateRuleRequest = serde_json::from_str(
            r#"{"action": "ACCEPT", "match": "IP_CIDR", "value": "192.0.2.1"}"#,
        )
        .unwrap();
        assert_eq!(req.match_kind, RuleMatchInput::IpCidr);
        assert!(req.priority.is_none());
        assert!(req.ip_set_id.is_none());
    }

    #[test]
    fn test_create_request_treats_empty_ip_set_as_absent() {
        let req: CreateRuleRequest = serde_json::from_str(
            r#"{"action": "DROP", "match": "CIDR", "value": "10.0.0.0/8", "ip_set_id": ""}"#,
        )
        .unwrap();
        assert!(req.ip_set_id.is_none());
    }

    #[test]
    fn test_update_request_all_fields_optional() {
        let req: UpdateRuleRequest = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(req.action.is_none());
        assert!(req.match_kind.is_none());
        assert_eq!(req.enabled, Some(false));
    }
}
