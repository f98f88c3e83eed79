//! shared test utilities for api integration tests

#![allow(dead_code)] // Test utilities may not all be used in every test file

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rampart_db::{Database, RampartDb};
use rampart_types::{Config, OrgId, Resource, ResourceId};
use tower::ServiceExt;

/// test fixture containing database and app for api tests
pub struct ApiTestFixture {
    pub db: RampartDb,
    pub app: Router,
}

impl ApiTestFixture {
    /// create a new test fixture with an in-memory database
    pub async fn new() -> Self {
        let db = RampartDb::new_in_memory().await.unwrap();
        let config = Config::default();
        let app = rampart::create_app(db.clone(), config);

        Self { db, app }
    }

    /// register a resource directly in the database
    pub async fn create_resource(&self, org: &str, name: &str, http_capable: bool) -> Resource {
        let resource = Resource::new(
            ResourceId(0),
            OrgId::from(org),
            name.to_string(),
            http_capable,
        );
        self.db.create_resource(&resource).await.unwrap()
    }

    /// send a request, returning the status and the parsed body.
    ///
    /// error responses carry a plain-text message; those come back as a
    /// json string value so callers can assert on the text.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });

        (status, body)
    }

    /// send a get request
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request("GET", uri, None).await
    }

    /// send a post request with a json body
    pub async fn post(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request("POST", uri, Some(body)).await
    }

    /// send a put request with a json body
    pub async fn put(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request("PUT", uri, Some(body)).await
    }

    /// send a delete request
    pub async fn delete(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request("DELETE", uri, None).await
    }
}
