//! rest api v1 handlers.
//!
//! rule authoring endpoints, org-scoped by path. authentication and
//! session handling stay with whatever fronts this service.

mod assignments;
mod ip_sets;
mod resource_rules;
mod resources;
mod template_rules;
mod templates;
mod validation;

use axum::Router;
use serde::{Deserialize, Deserializer};

use crate::AppState;

/// create the api v1 router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/org/{org_id}/resources", resources::router())
        .nest("/org/{org_id}/ipsets", ip_sets::router())
        .nest(
            "/org/{org_id}/templates",
            templates::router().merge(template_rules::router()),
        )
        .nest("/resources/{resource_id}/rules", resource_rules::router())
        .nest("/resources/{resource_id}/templates", assignments::router())
}

/// deserialize an optional string field treating `""` as absent.
pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
