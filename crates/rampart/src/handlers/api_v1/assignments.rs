//! template assignment endpoints for api v1.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::ApiError;
use rampart_types::{ResourceId, TemplateAssignment, TemplateId};

/// response wrapper for list assignments endpoint.
#[derive(Debug, Serialize)]
pub struct ListAssignmentsResponse {
    pub assignments: Vec<AssignmentResponse>,
}

/// assignment representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub resource_id: String,
    pub template_id: String,
    pub created_at: String,
}

impl From<TemplateAssignment> for AssignmentResponse {
    fn from(assignment: TemplateAssignment) -> Self {
        Self {
            resource_id: assignment.resource_id.to_string(),
            template_id: assignment.template_id.to_string(),
            created_at: assignment.created_at.to_rfc3339(),
        }
    }
}

/// response for assign template endpoint.
#[derive(Debug, Serialize)]
pub struct AssignTemplateResponse {
    pub assignment: AssignmentResponse,
    /// rule copies materialised on the resource.
    pub copies_created: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// response for unassign template endpoint.
#[derive(Debug, Serialize)]
pub struct UnassignTemplateResponse {
    /// rule copies removed from the resource.
    pub copies_removed: u64,
}

/// create the assignments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments))
        .route(
            "/{template_id}",
            axum::routing::post(assign_template).delete(unassign_template),
        )
}

/// list the templates assigned to a resource.
///
/// `GET /api/v1/resources/{resource_id}/templates`
async fn list_assignments(
    State(state): State<AppState>,
    Path(resource_id): Path<u64>,
) -> Result<Json<ListAssignmentsResponse>, ApiError> {
    let assignments = state
        .engine
        .list_assignments(ResourceId(resource_id))
        .await?;

    Ok(Json(ListAssignmentsResponse {
        assignments: assignments
            .into_iter()
            .map(AssignmentResponse::from)
            .collect(),
    }))
}

/// assign a template to a resource.
///
/// `POST /api/v1/resources/{resource_id}/templates/{template_id}`
///
/// the template's rules are copied onto the resource after its existing
/// rules. rules the resource cannot take are skipped and reported as
/// warnings; the assignment itself still succeeds.
async fn assign_template(
    State(state): State<AppState>,
    Path((resource_id, template_id)): Path<(u64, String)>,
) -> Result<(StatusCode, Json<AssignTemplateResponse>), ApiError> {
    let outcome = state
        .engine
        .assign_template(ResourceId(resource_id), &TemplateId::from(template_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignTemplateResponse {
            assignment: AssignmentResponse::from(outcome.assignment),
            copies_created: outcome.copies_created,
            warnings: outcome.warnings,
        }),
    ))
}

/// unassign a template from a resource, removing its rule copies.
///
/// `DELETE /api/v1/resources/{resource_id}/templates/{template_id}`
async fn unassign_template(
    State(state): State<AppState>,
    Path((resource_id, template_id)): Path<(u64, String)>,
) -> Result<Json<UnassignTemplateResponse>, ApiError> {
    let copies_removed = state
        .engine
        .unassign_template(ResourceId(resource_id), &TemplateId::from(template_id))
        .await?;

    Ok(Json(UnassignTemplateResponse { copies_removed }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_response_from_assignment() {
        let assignment = TemplateAssignment::new(ResourceId(4), TemplateId::from("tpl-edge"));
        let response = AssignmentResponse::from(assignment);

        assert_eq!(response.resource_id, "4");
        assert_eq!(response.template_id, "tpl-edge");
    }

    #[test]
    fn test_assign_response_includes_warnings_when_present() {
        let assignment = TemplateAssignment::new(ResourceId(4), TemplateId::from("tpl-edge"));
        let response = AssignTemplateResponse {
            assignment: AssignmentResponse::from(assignment),
            copies_created: 1,
            warnings: vec!["template rule 2 was not copied: resource is not http capable".to_string()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["copies_created"], 1);
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    }
}
