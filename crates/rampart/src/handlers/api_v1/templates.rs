//! rule template endpoints for api v1.

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
use rampart_rules::{NewTemplate, TemplateUpdate};
use rampart_types::{Name, OrgId, RuleTemplate, TemplateId};

use super::empty_string_as_none;
use super::resources::PaginationParams;
use super::validation::validate_description;

/// response wrapper for list templates endpoint.
#[derive(Debug, Serialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<TemplateResponse>,
}

/// template representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RuleTemplate> for TemplateResponse {
    fn from(template: RuleTemplate) -> Self {
        Self {
            id: template.id.to_string(),
            org_id: template.org_id.to_string(),
            name: template.name,
            description: template.description,
            created_at: template.created_at.to_rfc3339(),
            updated_at: template.updated_at.to_rfc3339(),
        }
    }
}

/// request body for creating a template.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    /// caller-supplied identifier; generated when absent.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    pub name: Name,
    #[serde(default)]
    pub description: Option<String>,
}

/// request body for updating a template. absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(default)]
    pub name: Option<Name>,
    #[serde(default)]
    pub description: Option<String>,
}

/// response for create template endpoint.
#[derive(Debug, Serialize)]
pub struct CreateTemplateResponse {
    pub template: TemplateResponse,
}

/// response for get template endpoint.
#[derive(Debug, Serialize)]
pub struct GetTemplateResponse {
    pub template: TemplateResponse,
}

/// response for update template endpoint.
#[derive(Debug, Serialize)]
pub struct UpdateTemplateResponse {
    pub template: TemplateResponse,
}

/// response for delete template endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteTemplateResponse {
    pub rules_removed: u64,
    pub copies_removed: u64,
    pub assignments_removed: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// create the templates router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route(
            "/{template_id}",
            get(get_template)
                .put(update_template)
                .delete(delete_template),
        )
}

/// list an organisation's templates.
///
/// `GET /api/v1/org/{org_id}/templates`
///
/// supports optional pagination: `?limit=100&offset=0`
async fn list_templates(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ListTemplatesResponse>, ApiError> {
    let templates = state.engine.list_templates(&OrgId::from(org_id)).await?;

    debug!(count = templates.len(), "listing templates");
    let templates: Vec<TemplateResponse> = pagination
        .apply(templates)
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(ListTemplatesResponse { templates }))
}

/// create a rule template.
///
/// `POST /api/v1/org/{org_id}/templates`
async fn create_template(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    JsonBody(req): JsonBody<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<CreateTemplateResponse>), ApiError> {
    validate_description(req.description.as_deref())?;

    let template = state
        .engine
        .create_template(
            &OrgId::from(org_id),
            NewTemplate {
                id: req.id.map(TemplateId::from),
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTemplateResponse {
            template: TemplateResponse::from(template),
        }),
    ))
}

/// get a template.
///
/// `GET /api/v1/org/{org_id}/templates/{template_id}`
async fn get_template(
    State(state): State<AppState>,
    Path((org_id, template_id)): Path<(String, String)>,
) -> Result<Json<GetTemplateResponse>, ApiError> {
    let template = state
        .engine
        .get_template(&OrgId::from(org_id), &TemplateId::from(template_id))
        .await?;

    Ok(Json(GetTemplateResponse {
        template: TemplateResponse::from(template),
    }))
}

/// update a template's name or description.
///
/// `PUT /api/v1/org/{org_id}/templates/{template_id}`
async fn update_template(
    State(state): State<AppState>,
    Path((org_id, template_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<UpdateTemplateRequest>,
) -> Result<Json<UpdateTemplateResponse>, ApiError> {
    validate_description(req.description.as_deref())?;

    let template = state
        .engine
        .update_template(
            &OrgId::from(org_id),
            &TemplateId::from(template_id),
            TemplateUpdate {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(Json(UpdateTemplateResponse {
        template: TemplateResponse::from(template),
    }))
}

/// delete a template, its rules, all assignments, and every copy on
/// assigned resources.
///
/// `DELETE /api/v1/org/{org_id}/templates/{template_id}`
async fn delete_template(
    State(state): State<AppState>,
    Path((org_id, template_id)): Path<(String, String)>,
) -> Result<Json<DeleteTemplateResponse>, ApiError> {
    let removal = state
        .engine
        .delete_template(&OrgId::from(org_id), &TemplateId::from(template_id))
        .await?;

    Ok(Json(DeleteTemplateResponse {
        rules_removed: removal.rules_removed,
        copies_removed: removal.copies_removed,
        assignments_removed: removal.assignments_removed,
        warnings: removal.warnings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_response_from_template() {
        let template = RuleTemplate::new(
            TemplateId::from("tpl-base"),
            OrgId::from("acme"),
            "baseline".to_string(),
            None,
        );
        let json = serde_json::to_value(TemplateResponse::from(template)).unwrap();

        assert_eq!(json["id"], "tpl-base");
        assert_eq!(json["name"], "baseline");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_create_request_rejects_invalid_name() {
        let result: Result<CreateTemplateRequest, _> =
            serde_json::from_str(r#"{"name": "Not Valid"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_treats_empty_id_as_absent() {
        let req: CreateTemplateRequest =
            serde_json::from_str(r#"{"id": "", "name": "baseline"}"#).unwrap();
        assert!(req.id.is_none());

        let req: CreateTemplateRequest =
            serde_json::from_str(r#"{"id": "tpl-mine", "name": "baseline"}"#).unwrap();
        assert_eq!(req.id.as_deref(), Some("tpl-mine"));
    }

    #[test]
    fn test_delete_response_omits_empty_warnings() {
        let response = DeleteTemplateResponse {
            rules_removed: 2,
            copies_removed: 4,
            assignments_removed: 1,
            warnings: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("warnings").is_none());
        assert_eq!(json["copies_removed"], 4);
    }
}
