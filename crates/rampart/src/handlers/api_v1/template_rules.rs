//! template rule endpoints for api v1.
//!
//! template rule changes fan out to every assigned resource, so the
//! responses carry the number of copies affected and any per-resource
//! warnings alongside the rule itself.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::{ApiError, JsonBody};
use rampart_rules::{TemplateRuleSpec, TemplateRuleUpdate};
use rampart_types::{OrgId, RuleAction, RuleMatch, RuleMatchInput, TemplateId, TemplateRule, TemplateRuleId};

/// response wrapper for list template rules endpoint.
#[derive(Debug, Serialize)]
pub struct ListTemplateRulesResponse {
    pub rules: Vec<TemplateRuleResponse>,
}

/// template rule representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateRuleResponse {
    pub id: String,
    pub template_id: String,
    pub action: RuleAction,
    #[serde(rename = "match")]
    pub match_kind: RuleMatch,
    pub value: String,
    pub priority: i64,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TemplateRule> for TemplateRuleResponse {
    fn from(rule: TemplateRule) -> Self {
        Self {
            id: rule.id.to_string(),
            template_id: rule.template_id.to_string(),
            action: rule.action,
            match_kind: rule.match_kind,
            value: rule.value,
            priority: rule.priority,
            enabled: rule.enabled,
            created_at: rule.created_at.to_rfc3339(),
            updated_at: rule.updated_at.to_rfc3339(),
        }
    }
}

/// request body for adding a rule to a template.
#[derive(Debug, Deserialize)]
pub struct AddTemplateRuleRequest {
    pub action: RuleAction,
    #[serde(rename = "match")]
    pub match_kind: RuleMatchInput,
    pub value: String,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// request body for updating a template rule. absent fields are left
/// unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRuleRequest {
    #[serde(default)]
    pub action: Option<RuleAction>,
    #[serde(default, rename = "match")]
    pub match_kind: Option<RuleMatchInput>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// response for add template rule endpoint.
#[derive(Debug, Serialize)]
pub struct AddTemplateRuleResponse {
    pub rule: TemplateRuleResponse,
    /// copies created on resources the template is assigned to.
    pub copies_created: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// response for update template rule endpoint.
#[derive(Debug, Serialize)]
pub struct UpdateTemplateRuleResponse {
    pub rule: TemplateRuleResponse,
    /// copies updated on resources the template is assigned to.
    pub copies_updated: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// response for delete template rule endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteTemplateRuleResponse {
    /// copies removed from resources the template is assigned to.
    pub copies_removed: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// create the template rules router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{template_id}/rules",
            get(list_template_rules).post(add_template_rule),
        )
        .route(
            "/{template_id}/rules/{rule_id}",
            axum::routing::put(update_template_rule).delete(delete_template_rule),
        )
}

/// list a template's rules in priority order.
///
/// `GET /api/v1/org/{org_id}/templates/{template_id}/rules`
async fn list_template_rules(
    State(state): State<AppState>,
    Path((org_id, template_id)): Path<(String, String)>,
) -> Result<Json<ListTemplateRulesResponse>, ApiError> {
    let rules = state
        .engine
        .list_template_rules(&OrgId::from(org_id), &TemplateId::from(template_id))
        .await?;

    Ok(Json(ListTemplateRulesResponse {
        rules: rules.into_iter().map(TemplateRuleResponse::from).collect(),
    }))
}

/// add a rule to a template.
///
/// `POST /api/v1/org/{org_id}/templates/{template_id}/rules`
///
/// the rule is copied to every resource the template is assigned to;
/// resources that cannot take the rule are reported as warnings.
async fn add_template_rule(
    State(state): State<AppState>,
    Path((org_id, template_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<AddTemplateRuleRequest>,
) -> Result<(StatusCode, Json<AddTemplateRuleResponse>), ApiError> {
    let (rule, propagation) = state
        .engine
        .add_template_rule(
            &OrgId::from(org_id),
            &TemplateId::from(template_id),
            TemplateRuleSpec {
                action: req.action,
                match_kind: req.match_kind,
                value: req.value,
                priority: req.priority,
                enabled: req.enabled,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddTemplateRuleResponse {
            rule: TemplateRuleResponse::from(rule),
            copies_created: propagation.copies_affected,
            warnings: propagation.warnings,
        }),
    ))
}

/// update a template rule and push the change to every copy.
///
/// `PUT /api/v1/org/{org_id}/templates/{template_id}/rules/{rule_id}`
///
/// priority changes reorder the template only; existing copies keep
/// their per-resource priorities.
async fn update_template_rule(
    State(state): State<AppState>,
    Path((org_id, template_id, rule_id)): Path<(String, String, u64)>,
    JsonBody(req): JsonBody<UpdateTemplateRuleRequest>,
) -> Result<Json<UpdateTemplateRuleResponse>, ApiError> {
    let (rule, propagation) = state
        .engine
        .update_template_rule(
            &OrgId::from(org_id),
            &TemplateId::from(template_id),
            TemplateRuleId(rule_id),
            TemplateRuleUpdate {
                action: req.action,
                match_kind: req.match_kind,
                value: req.value,
                priority: req.priority,
                enabled: req.enabled,
            },
        )
        .await?;

    Ok(Json(UpdateTemplateRuleResponse {
        rule: TemplateRuleResponse::from(rule),
        copies_updated: propagation.copies_affected,
        warnings: propagation.warnings,
    }))
}

/// delete a template rule and remove its copies everywhere.
///
/// `DELETE /api/v1/org/{org_id}/templates/{template_id}/rules/{rule_id}`
async fn delete_template_rule(
    State(state): State<AppState>,
    Path((org_id, template_id, rule_id)): Path<(String, String, u64)>,
) -> Result<Json<DeleteTemplateRuleResponse>, ApiError> {
    let removal = state
        .engine
        .delete_template_rule(
            &OrgId::from(org_id),
            &TemplateId::from(template_id),
            TemplateRuleId(rule_id),
        )
        .await?;

    Ok(Json(DeleteTemplateRuleResponse {
        copies_removed: removal.copies_removed,
        warnings: removal.warnings,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_template_rule_response_wire_shape() {
        let now = Utc::now();
        let rule = TemplateRule {
            id: TemplateRuleId(5),
            template_id: TemplateId::from("tpl-base"),
            action: RuleAction::Drop,
            match_kind: RuleMatch::Path,
            value: "/admin/*".to_string(),
            priority: 2,
            enabled: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(TemplateRuleResponse::from(rule)).unwrap();

        assert_eq!(json["id"], "5");
        assert_eq!(json["template_id"], "tpl-base");
        assert_eq!(json["action"], "DROP");
        assert_eq!(json["match"], "PATH");
        assert_eq!(json["value"], "/admin/*");
    }

    #[test]
    fn test_add_request_rejects_unknown_match() {
        let result: Result<AddTemplateRuleRequest, _> = serde_json::from_str(
            r#"{"action": "ACCEPT", "match": "HOSTNAME", "value": "example.com"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_response_omits_empty_warnings() {
        let now = Utc::now();
        let response = AddTemplateRuleResponse {
            rule: TemplateRuleResponse {
                id: "1".to_string(),
                template_id: "tpl-a".to_string(),
                action: RuleAction::Accept,
                match_kind: RuleMatch::Cidr,
                value: "10.0.0.0/8".to_string(),
                priority: 1,
                enabled: true,
                created_at: now.to_rfc3339(),
                updated_at: now.to_rfc3339(),
            },
            copies_created: 3,
            warnings: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["copies_created"], 3);
        assert!(json.get("warnings").is_none());
    }
}
