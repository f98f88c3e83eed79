//! ip set endpoints for api v1.

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
use rampart_rules::{IpSetSpec, IpSetUpdate};
use rampart_types::{IpSet, IpSetId, Name, OrgId};

use super::resources::PaginationParams;
use super::validation::validate_description;

/// response wrapper for list ip sets endpoint.
#[derive(Debug, Serialize)]
pub struct ListIpSetsResponse {
    pub ip_sets: Vec<IpSetResponse>,
}

/// ip set representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct IpSetResponse {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub addresses: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<IpSet> for IpSetResponse {
    fn from(set: IpSet) -> Self {
        Self {
            id: set.id.to_string(),
            org_id: set.org_id.to_string(),
            name: set.name,
            description: set.description,
            addresses: set.addresses,
            created_at: set.created_at.to_rfc3339(),
            updated_at: set.updated_at.to_rfc3339(),
        }
    }
}

/// request body for creating an ip set.
#[derive(Debug, Deserialize)]
pub struct CreateIpSetRequest {
    pub name: Name,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// request body for updating an ip set. absent fields are left
/// unchanged; a present address list replaces the stored one.
#[derive(Debug, Deserialize)]
pub struct UpdateIpSetRequest {
    #[serde(default)]
    pub name: Option<Name>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub addresses: Option<Vec<String>>,
}

/// response for create ip set endpoint.
#[derive(Debug, Serialize)]
pub struct CreateIpSetResponse {
    pub ip_set: IpSetResponse,
}

/// response for get ip set endpoint.
#[derive(Debug, Serialize)]
pub struct GetIpSetResponse {
    pub ip_set: IpSetResponse,
}

/// response for update ip set endpoint.
#[derive(Debug, Serialize)]
pub struct UpdateIpSetResponse {
    pub ip_set: IpSetResponse,
}

/// response for delete ip set endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteIpSetResponse {}

/// create the ip sets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ip_sets).post(create_ip_set))
        .route(
            "/{ip_set_id}",
            get(get_ip_set).put(update_ip_set).delete(delete_ip_set),
        )
}

/// list an organisation's ip sets.
///
/// `GET /api/v1/org/{org_id}/ipsets`
///
/// supports optional pagination: `?limit=100&offset=0`
async fn list_ip_sets(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ListIpSetsResponse>, ApiError> {
    let sets = state.engine.list_ip_sets(&OrgId::from(org_id)).await?;

    debug!(count = sets.len(), "listing ip sets");
    let ip_sets: Vec<IpSetResponse> = pagination
        .apply(sets)
        .into_iter()
        .map(IpSetResponse::from)
        .collect();

    Ok(Json(ListIpSetsResponse { ip_sets }))
}

/// create an ip set.
///
/// `POST /api/v1/org/{org_id}/ipsets`
async fn create_ip_set(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    JsonBody(req): JsonBody<CreateIpSetRequest>,
) -> Result<(StatusCode, Json<CreateIpSetResponse>), ApiError> {
    validate_description(req.description.as_deref())?;

    let set = state
        .engine
        .create_ip_set(
            &OrgId::from(org_id),
            IpSetSpec {
                name: req.name,
                description: req.description,
                addresses: req.addresses,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateIpSetResponse {
            ip_set: IpSetResponse::from(set),
        }),
    ))
}

/// get an ip set.
///
/// `GET /api/v1/org/{org_id}/ipsets/{ip_set_id}`
async fn get_ip_set(
    State(state): State<AppState>,
    Path((org_id, ip_set_id)): Path<(String, String)>,
) -> Result<Json<GetIpSetResponse>, ApiError> {
    let set = state
        .engine
        .get_ip_set(&OrgId::from(org_id), &IpSetId::from(ip_set_id))
        .await?;

    Ok(Json(GetIpSetResponse {
        ip_set: IpSetResponse::from(set),
    }))
}

/// update an ip set's name, description, or membership.
///
/// `PUT /api/v1/org/{org_id}/ipsets/{ip_set_id}`
///
/// rules referencing the set pick up membership changes without being
/// touched themselves.
async fn update_ip_set(
    State(state): State<AppState>,
    Path((org_id, ip_set_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<UpdateIpSetRequest>,
) -> Result<Json<UpdateIpSetResponse>, ApiError> {
    validate_description(req.description.as_deref())?;

    let set = state
        .engine
        .update_ip_set(
            &OrgId::from(org_id),
            &IpSetId::from(ip_set_id),
            IpSetUpdate {
                name: req.name,
                description: req.description,
                addresses: req.addresses,
            },
        )
        .await?;

    Ok(Json(UpdateIpSetResponse {
        ip_set: IpSetResponse::from(set),
    }))
}

/// delete an ip set that no rule references.
///
/// `DELETE /api/v1/org/{org_id}/ipsets/{ip_set_id}`
async fn delete_ip_set(
    State(state): State<AppState>,
    Path((org_id, ip_set_id)): Path<(String, String)>,
) -> Result<Json<DeleteIpSetResponse>, ApiError> {
    state
        .engine
        .delete_ip_set(&OrgId::from(org_id), &IpSetId::from(ip_set_id))
        .await?;

    Ok(Json(DeleteIpSetResponse {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_set_response_from_set() {
        let set = IpSet::new(
            IpSetId::from("ips-office"),
            OrgId::from("acme"),
            "office".to_string(),
            Some("office egress ranges".to_string()),
            vec!["203.0.113.0/24".to_string(), "198.51.100.7".to_string()],
        );
        let json = serde_json::to_value(IpSetResponse::from(set)).unwrap();

        assert_eq!(json["id"], "ips-office");
        assert_eq!(json["description"], "office egress ranges");
        assert_eq!(json["addresses"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_create_request_defaults_to_empty_addresses() {
        let req: CreateIpSetRequest = serde_json::from_str(r#"{"name": "office"}"#).unwrap();
        assert!(req.addresses.is_empty());
        assert!(req.description.is_none());
    }

    #[test]
    fn test_update_request_distinguishes_absent_from_empty() {
        let req: UpdateIpSetRequest = serde_json::from_str(r#"{"name": "vpn"}"#).unwrap();
        assert!(req.addresses.is_none());

        let req: UpdateIpSetRequest = serde_json::from_str(r#"{"addresses": []}"#).unwrap();
        assert_eq!(req.addresses, Some(Vec::new()));
    }
}
