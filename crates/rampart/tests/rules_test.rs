//! integration tests for resource rule authoring over http.
//!
//! covers value classification for `IP_CIDR` submissions, strict
//! validation of explicit kinds, the http capability gate, and the
//! ip set reference lifecycle.

use axum::http::StatusCode;
use serde_json::json;

mod api_common;
use api_common::ApiTestFixture;

/// `IP_CIDR` submissions are classified server-side: bare addresses
/// become host networks, cidr values are kept, and anything else is
/// stored untouched as an `IP` rule.
#[tokio::test]
async fn test_ip_cidr_classification() {
    let fixture = ApiTestFixture::new().await;
    let resource = fixture.create_resource("acme", "wiki", true).await;
    let rules_uri = format!("/api/v1/resources/{}/rules", resource.id.0);

    let (status, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "IP_CIDR", "value": "192.0.2.1"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rule"]["match"], "CIDR");
    assert_eq!(body["rule"]["value"], "192.0.2.1/32");

    let (status, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "IP_CIDR", "value": "10.0.0.0/8"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rule"]["match"], "CIDR");
    assert_eq!(body["rule"]["value"], "10.0.0.0/8");

    // the fallback stores the value unvalidated
    let (status, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "DROP", "match": "IP_CIDR", "value": "evil.example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rule"]["match"], "IP");
    assert_eq!(body["rule"]["value"], "evil.example.com");
}

/// explicit kinds are validated strictly, unlike the `IP_CIDR` fallback.
#[tokio::test]
async fn test_explicit_kinds_validated() {
    let fixture = ApiTestFixture::new().await;
    let resource = fixture.create_resource("acme", "wiki", true).await;
    let rules_uri = format!("/api/v1/resources/{}/rules", resource.id.0);

    let (status, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "CIDR", "value": "10.0.0.1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("CIDR"));

    let (status, _) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "IP", "value": "10.0.0.0/8"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown enum tokens are rejected at the body parsing layer
    let (status, _) = fixture
        .post(
            &rules_uri,
            json!({"action": "ALLOW", "match": "CIDR", "value": "10.0.0.0/8"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// request-level rules require an http-capable resource.
#[tokio::test]
async fn test_path_rules_require_http_capability() {
    let fixture = ApiTestFixture::new().await;
    let tcp = fixture.create_resource("acme", "db-primary", false).await;
    let web = fixture.create_resource("acme", "wiki", true).await;

    let (status, body) = fixture
        .post(
            &format!("/api/v1/resources/{}/rules", tcp.id.0),
            json!({"action": "DROP", "match": "PATH", "value": "/admin/*"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("http"));

    let (status, _) = fixture
        .post(
            &format!("/api/v1/resources/{}/rules", web.id.0),
            json!({"action": "DROP", "match": "PATH", "value": "/admin/*"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

/// ip set rules pin the stored value to the set id, and a referenced
/// set cannot be deleted until its rules are gone.
#[tokio::test]
async fn test_ip_set_reference_lifecycle() {
    let fixture = ApiTestFixture::new().await;
    let resource = fixture.create_resource("acme", "wiki", true).await;
    let rules_uri = format!("/api/v1/resources/{}/rules", resource.id.0);

    let (status, body) = fixture
        .post(
            "/api/v1/org/acme/ipsets",
            json!({"name": "office", "addresses": ["203.0.113.0/24", "198.51.100.7"]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let set_id = body["ip_set"]["id"].as_str().unwrap().to_string();
    let set_uri = format!("/api/v1/org/acme/ipsets/{}", set_id);

    let (status, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "IP_SET", "value": "", "ip_set_id": set_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rule"]["match"], "IP_SET");
    assert_eq!(body["rule"]["value"], set_id);
    assert_eq!(body["rule"]["ip_set_id"], set_id);
    let rule_id = body["rule"]["id"].as_str().unwrap().to_string();

    // referenced sets cannot be deleted
    let (status, body) = fixture.delete(&set_uri).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.as_str().unwrap().contains("referenced"));

    let (status, _) = fixture
        .delete(&format!("{}/{}", rules_uri, rule_id))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = fixture.delete(&set_uri).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = fixture.get(&set_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// a rule referencing a missing or foreign ip set is rejected without
/// revealing whether the set exists elsewhere.
#[tokio::test]
async fn test_foreign_ip_set_rejected() {
    let fixture = ApiTestFixture::new().await;
    let resource = fixture.create_resource("acme", "wiki", true).await;

    let (_, body) = fixture
        .post(
            "/api/v1/org/umbrella/ipsets",
            json!({"name": "office", "addresses": ["203.0.113.0/24"]}),
        )
        .await;
    let foreign_set = body["ip_set"]["id"].as_str().unwrap().to_string();

    for set_id in [foreign_set.as_str(), "ips-nonexistent"] {
        let (status, body) = fixture
            .post(
                &format!("/api/v1/resources/{}/rules", resource.id.0),
                json!({"action": "ACCEPT", "match": "IP_SET", "value": "", "ip_set_id": set_id}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.as_str().unwrap().contains("does not exist"));
    }
}

/// updating the match tuple re-normalises it as a whole, and updates
/// through the wrong resource are rejected.
#[tokio::test]
async fn test_rule_update_renormalizes() {
    let fixture = ApiTestFixture::new().await;
    let wiki = fixture.create_resource("acme", "wiki", true).await;
    let docs = fixture.create_resource("acme", "docs", true).await;
    let rules_uri = format!("/api/v1/resources/{}/rules", wiki.id.0);

    let (_, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "CIDR", "value": "10.0.0.0/8"}),
        )
        .await;
    let rule_id = body["rule"]["id"].as_str().unwrap().to_string();
    let rule_uri = format!("{}/{}", rules_uri, rule_id);

    let (status, body) = fixture
        .put(
            &rule_uri,
            json!({"match": "IP_CIDR", "value": "192.0.2.7"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rule"]["match"], "CIDR");
    assert_eq!(body["rule"]["value"], "192.0.2.7/32");

    // an empty update changes nothing and says so
    let (status, _) = fixture.put(&rule_uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the rule belongs to wiki, not docs
    let (status, _) = fixture
        .put(
            &format!("/api/v1/resources/{}/rules/{}", docs.id.0, rule_id),
            json!({"enabled": false}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// explicit priorities are stored verbatim, duplicates included;
/// omitted priorities append after the current maximum.
#[tokio::test]
async fn test_priority_allocation() {
    let fixture = ApiTestFixture::new().await;
    let resource = fixture.create_resource("acme", "wiki", true).await;
    let rules_uri = format!("/api/v1/resources/{}/rules", resource.id.0);

    let (_, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "CIDR", "value": "10.0.0.0/8", "priority": 40}),
        )
        .await;
    assert_eq!(body["rule"]["priority"], 40);

    // duplicate priorities are allowed
    let (status, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "DROP", "match": "IP", "value": "192.0.2.9", "priority": 40}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rule"]["priority"], 40);

    // omitted priority appends after the maximum
    let (_, body) = fixture
        .post(
            &rules_uri,
            json!({"action": "ACCEPT", "match": "IP_CIDR", "value": "198.51.100.4"}),
        )
        .await;
    assert_eq!(body["rule"]["priority"], 41);
}
