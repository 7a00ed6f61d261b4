//! Integration tests for `JiraClient` using wiremock HTTP mocks.

use brandinput_core::{FieldIds, TicketField, TicketQuery, TicketStore, Variety};
use brandinput_jira::{JiraClient, JiraError};
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> JiraClient {
    JiraClient::new(base_url, "bot", "secret", 30, FieldIds::default(), 500)
        .expect("client construction should not fail")
}

fn query(jql: &str) -> TicketQuery {
    TicketQuery {
        variety: Variety::Standard,
        jql: jql.to_string(),
    }
}

#[tokio::test]
async fn search_maps_issues_to_tickets() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "total": 2,
        "issues": [
            {
                "key": "CPG-1",
                "fields": {
                    "reporter": { "name": "intake.bot", "displayName": "Intake Bot" },
                    "status": { "name": "Open" },
                    "customfield_10414": "Pepsico",
                    "customfield_17018": "https://hub.example.com/studies/9001",
                    "customfield_17028": { "value": "YouTube" }
                }
            },
            {
                "key": "CPG-2",
                "fields": {
                    "customfield_10414": "Acme Foods",
                    "customfield_11492": 501
                }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("jql", "project = MEAS"))
        .and(query_param("maxResults", "500"))
        .and(basic_auth("bot", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let tickets = client
        .search(&query("project = MEAS"))
        .await
        .expect("search should succeed");

    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].key, "CPG-1");
    assert_eq!(tickets[0].media_partner.as_deref(), Some("YouTube"));
    assert_eq!(tickets[0].reporter.as_deref(), Some("Intake Bot"));
    assert_eq!(tickets[1].account_id, Some(501));
    assert!(tickets[1].study_reference.is_none());
}

#[tokio::test]
async fn search_with_no_matches_returns_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "total": 0, "issues": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let tickets = client.search(&query("project = MEAS")).await.unwrap();
    assert!(tickets.is_empty());
}

#[tokio::test]
async fn bad_jql_surfaces_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "errorMessages": ["bad jql"] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search(&query("project = ")).await.unwrap_err();
    match err {
        JiraError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("bad jql"), "{body}");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_search_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search(&query("project = MEAS")).await.unwrap_err();
    assert!(matches!(err, JiraError::Deserialize { .. }), "{err:?}");
}

#[tokio::test]
async fn get_ticket_reads_single_issue() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/CPG-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "key": "CPG-9",
            "fields": {
                "customfield_12325": { "name": "dana.li", "displayName": "Dana Li" }
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ticket = client.get_ticket("CPG-9").await.unwrap();
    assert_eq!(ticket.key, "CPG-9");
    assert_eq!(ticket.lead_analyst.as_deref(), Some("dana.li"));
}

#[tokio::test]
async fn update_lead_analyst_puts_user_field() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/CPG-3"))
        .and(body_json(serde_json::json!({
            "fields": { "customfield_12325": { "name": "dana.li" } }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .update_field("CPG-3", TicketField::LeadAnalyst, "dana.li")
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn set_reporter_puts_reporter_field() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/CPG-3"))
        .and(body_json(serde_json::json!({
            "fields": { "reporter": { "name": "sam.ortiz" } }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.set_reporter("CPG-3", "sam.ortiz").await.unwrap();
}

#[tokio::test]
async fn add_watcher_posts_bare_json_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/CPG-3/watchers"))
        .and(body_json(serde_json::json!("lee.park")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.add_watcher("CPG-3", "lee.park").await.unwrap();
}

#[tokio::test]
async fn transition_posts_transition_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/CPG-3/transitions"))
        .and(body_json(serde_json::json!({ "transition": { "id": "21" } })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.transition("CPG-3", "21").await.unwrap();
}

#[tokio::test]
async fn rejected_transition_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/CPG-3/transitions"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.transition("CPG-3", "21").await.unwrap_err();
    assert!(matches!(err, JiraError::UnexpectedStatus { status: 400, .. }));
}
