use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadhub_models::LeadType;
use leadhub_sync::{ConnectionCheck, ExternalLeadApiClient, LeadFilters, SourceClientError};

fn filters() -> LeadFilters {
    LeadFilters {
        lead_type: LeadType::Both,
        days: None,
        source: None,
        campaign: None,
    }
}

#[tokio::test]
async fn connection_test_reports_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .and(query_param("limit", "1"))
        .and(header("authorization", "Bearer secret-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [], "total": 42 })),
        )
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "secret-key");
    let check = client.test_connection().await;

    assert!(check.is_ok());
    assert!(matches!(check, ConnectionCheck::Connected { total: Some(42) }));
}

#[tokio::test]
async fn connection_test_classifies_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "wrong-key");
    match client.test_connection().await {
        ConnectionCheck::AuthenticationFailed { detail } => {
            assert!(detail.contains("401"), "detail was: {detail}")
        }
        other => panic!("expected authentication failure, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_test_classifies_upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "key");
    match client.test_connection().await {
        ConnectionCheck::ApiError { detail } => assert_eq!(detail, "maintenance window"),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_test_classifies_unreachable_hosts() {
    // Nothing listens on this port.
    let client = ExternalLeadApiClient::new("http://127.0.0.1:9", "key");
    assert!(matches!(
        client.test_connection().await,
        ConnectionCheck::Unreachable { .. }
    ));
}

#[tokio::test]
async fn fetch_sends_every_configured_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .and(query_param("type", "marketing"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "200"))
        .and(query_param("days", "7"))
        .and(query_param("source", "facebook"))
        .and(query_param("campaign", "spring-launch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "l1", "fullName": "Mario Rossi", "phone": "3331112233", "status": "new", "type": "marketing" },
                { "id": "l2", "fullName": "Anna Bianchi", "phone": "3345556677", "status": "new", "type": "marketing" },
            ],
            "total": 2,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "key");
    let page = client
        .fetch_leads(
            &LeadFilters {
                lead_type: LeadType::Marketing,
                days: Some("7".to_string()),
                source: Some("facebook".to_string()),
                campaign: Some("spring-launch".to_string()),
            },
            100,
            200,
        )
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total, Some(2));
    assert_eq!(page.data[0].full_name.as_deref(), Some("Mario Rossi"));
}

#[tokio::test]
async fn fetch_rejects_a_response_without_a_success_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "key");
    let err = client.fetch_leads(&filters(), 100, 0).await.unwrap_err();
    assert!(matches!(err, SourceClientError::MalformedResponse));
}

#[tokio::test]
async fn fetch_surfaces_an_upstream_reported_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "quota exceeded" })),
        )
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "key");
    match client.fetch_leads(&filters(), 100, 0).await.unwrap_err() {
        SourceClientError::Api { detail, .. } => assert_eq!(detail, "quota exceeded"),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_classifies_auth_failures_distinctly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = ExternalLeadApiClient::new(&server.uri(), "revoked-key");
    assert!(matches!(
        client.fetch_leads(&filters(), 100, 0).await.unwrap_err(),
        SourceClientError::AuthenticationFailed(_)
    ));
}
