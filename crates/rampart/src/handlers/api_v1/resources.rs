//! resource endpoints for api v1.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::AppState;
use crate::handlers::{ApiError, JsonBody, OptionExt, ResultExt};
use rampart_db::Database;
use rampart_types::{OrgId, Resource, ResourceId};

use super::validation::validate_resource_name;

/// pagination query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    /// maximum number of items to return. omit for all.
    pub limit: Option<usize>,
    /// number of items to skip. default 0.
    pub offset: Option<usize>,
}

impl PaginationParams {
    /// apply pagination to a vec of items.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let items: Vec<T> = items.into_iter().skip(offset).collect();
        match self.limit {
            Some(limit) => items.into_iter().take(limit).collect(),
            None => items,
        }
    }
}

/// response wrapper for list resources endpoint.
#[derive(Debug, Serialize)]
pub struct ListResourcesResponse {
    pub resources: Vec<ResourceResponse>,
}

/// resource representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub http_capable: bool,
    pub created_at: String,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            org_id: resource.org_id.to_string(),
            name: resource.name,
            http_capable: resource.http_capable,
            created_at: resource.created_at.to_rfc3339(),
        }
    }
}

/// request body for registering a resource.
#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    #[serde(default)]
    pub http_capable: bool,
}

/// response for create resource endpoint.
#[derive(Debug, Serialize)]
pub struct CreateResourceResponse {
    pub resource: ResourceResponse,
}

/// response for get resource endpoint.
#[derive(Debug, Serialize)]
pub struct GetResourceResponse {
    pub resource: ResourceResponse,
}

/// response for delete resource endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteResourceResponse {}

/// create the resources router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route(
            "/{resource_id}",
            get(get_resource).delete(delete_resource),
        )
}

/// fetch a resource that belongs to the organisation in the path.
async fn resource_in_org(
    state: &AppState,
    org_id: &str,
    resource_id: u64,
) -> Result<Resource, ApiError> {
    state
        .db
        .get_resource(ResourceId(resource_id))
        .await
        .map_internal()?
        .filter(|r| r.org_id.as_str() == org_id)
        .or_not_found("resource not found")
}

/// list an organisation's resources.
///
/// `GET /api/v1/org/{org_id}/resources`
///
/// supports optional pagination: `?limit=100&offset=0`
async fn list_resources(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ListResourcesResponse>, ApiError> {
    let resources = state
        .db
        .list_resources(&OrgId::from(org_id))
        .await
        .map_internal()?;

    debug!(count = resources.len(), "listing resources");
    let resources: Vec<ResourceResponse> = pagination
        .apply(resources)
        .into_iter()
        .map(ResourceResponse::from)
        .collect();

    Ok(Json(ListResourcesResponse { resources }))
}

/// register a resource.
///
/// `POST /api/v1/org/{org_id}/resources`
async fn create_resource(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    JsonBody(req): JsonBody<CreateResourceRequest>,
) -> Result<(StatusCode, Json<CreateResourceResponse>), ApiError> {
    validate_resource_name(&req.name)?;

    let resource = Resource::new(
        ResourceId(0),
        OrgId::from(org_id),
        req.name,
        req.http_capable,
    );
    let resource = state.db.create_resource(&resource).await.map_internal()?;

    info!(
        resource_id = resource.id.0,
        org_id = %resource.org_id,
        name = %resource.name,
        "resource registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreateResourceResponse {
            resource: ResourceResponse::from(resource),
        }),
    ))
}

/// get a resource.
///
/// `GET /api/v1/org/{org_id}/resources/{resource_id}`
async fn get_resource(
    State(state): State<AppState>,
    Path((org_id, resource_id)): Path<(String, u64)>,
) -> Result<Json<GetResourceResponse>, ApiError> {
    let resource = resource_in_org(&state, &org_id, resource_id).await?;

    Ok(Json(GetResourceResponse {
        resource: ResourceResponse::from(resource),
    }))
}

/// delete a resource along with its rules and template assignments.
///
/// `DELETE /api/v1/org/{org_id}/resources/{resource_id}`
async fn delete_resource(
    State(state): State<AppState>,
    Path((org_id, resource_id)): Path<(String, u64)>,
) -> Result<Json<DeleteResourceResponse>, ApiError> {
    let resource = resource_in_org(&state, &org_id, resource_id).await?;

    let rules_deleted = state
        .db
        .delete_rules_for_resource(resource.id)
        .await
        .map_internal()?;

    let assignments_deleted = state
        .db
        .delete_assignments_for_resource(resource.id)
        .await
        .map_internal()?;

    state.db.delete_resource(resource.id).await.map_internal()?;

    info!(
        resource_id,
        rules_deleted, assignments_deleted, "resource deleted"
    );
    Ok(Json(DeleteResourceResponse {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_response_from_resource() {
        let resource = Resource::new(
            ResourceId(7),
            OrgId::from("acme"),
            "wiki".to_string(),
            true,
        );
        let response = ResourceResponse::from(resource);

        assert_eq!(response.id, "7");
        assert_eq!(response.org_id, "acme");
        assert_eq!(response.name, "wiki");
        assert!(response.http_capable);
    }

    #[test]
    fn test_create_resource_request_defaults() {
        let req: CreateResourceRequest = serde_json::from_str(r#"{"name": "db-primary"}"#).unwrap();
        assert_eq!(req.name, "db-primary");
        assert!(!req.http_capable);

        let req: CreateResourceRequest =
            serde_json::from_str(r#"{"name": "wiki", "http_capable": true}"#).unwrap();
        assert!(req.http_capable);
    }

    #[test]
    fn test_pagination_applies_offset_then_limit() {
        let params = PaginationParams {
            limit: Some(2),
            offset: Some(1),
        };
        assert_eq!(params.apply(vec![1, 2, 3, 4]), vec![2, 3]);

        let params = PaginationParams {
            limit: None,
            offset: None,
        };
        assert_eq!(params.apply(vec![1, 2, 3]), vec![1, 2, 3]);
    }
}
