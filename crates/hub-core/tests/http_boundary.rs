//! # HTTP Boundary Tests
//!
//! Drives the axum router in-process with `oneshot` against a hub backed by
//! the mock callback client.
//!
//! ## Test Categories
//!
//! 1. **Intent** - status code per verification outcome
//! 2. **Publish** - 202 acceptance, background fan-out, body limits
//! 3. **Admin** - health, metrics, topics

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use hub_core::testing::{ChallengeBehavior, MockCallbackClient};
use hub_core::{build_router, CallbackClient, HubApi, HubConfig, HubService};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn make_hub_with_config(config: HubConfig) -> (Router, Arc<HubService>, Arc<MockCallbackClient>) {
    let client = Arc::new(MockCallbackClient::new());
    let hub = Arc::new(
        HubService::new(config.clone(), Arc::clone(&client) as Arc<dyn CallbackClient>).unwrap(),
    );
    let router = build_router(Arc::clone(&hub) as Arc<dyn HubApi>, &config);
    (router, hub, client)
}

fn make_hub() -> (Router, Arc<HubService>, Arc<MockCallbackClient>) {
    make_hub_with_config(HubConfig::default())
}

fn intent_request(form: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn publish_request(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Fan-out runs after the 202, so poll until the expected count arrives.
async fn wait_for_deliveries(client: &MockCallbackClient, expected: usize) {
    for _ in 0..200 {
        if client.deliveries().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} deliveries, saw {}",
        client.deliveries().len()
    );
}

const SUBSCRIBE_FORM: &str =
    "hub.mode=subscribe&hub.topic=news&hub.callback=http%3A%2F%2Fsub1%2Fcb&hub.secret=s1";

// =============================================================================
// INTENT
// =============================================================================

#[tokio::test]
async fn test_subscribe_returns_200_and_commits() {
    let (router, hub, _client) = make_hub();

    let response = router.oneshot(intent_request(SUBSCRIBE_FORM)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["mode"], "subscribe");
    assert_eq!(json["topic"], "news");
    assert!(hub.registry().contains("news", "http://sub1/cb"));
}

#[tokio::test]
async fn test_intent_via_query_string() {
    let (router, hub, _client) = make_hub();

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/?{SUBSCRIBE_FORM}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(hub.registry().contains("news", "http://sub1/cb"));
}

#[tokio::test]
async fn test_malformed_intents_are_400_without_io() {
    let (router, _hub, client) = make_hub();

    let cases = [
        "hub.topic=news&hub.callback=http%3A%2F%2Fsub1%2Fcb",
        "hub.mode=renew&hub.topic=news&hub.callback=http%3A%2F%2Fsub1%2Fcb",
        "hub.mode=subscribe&hub.callback=http%3A%2F%2Fsub1%2Fcb",
        "hub.mode=subscribe&hub.topic=&hub.callback=http%3A%2F%2Fsub1%2Fcb",
        "hub.mode=subscribe&hub.topic=news",
        "hub.mode=subscribe&hub.topic=news&hub.callback=not-a-url",
        "hub.mode=subscribe&hub.topic=news&hub.callback=ftp%3A%2F%2Fsub1%2Fcb",
    ];

    for form in cases {
        let response = router.clone().oneshot(intent_request(form)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "form: {form}");
        let json = json_body(response).await;
        assert!(json["error"].is_string());
    }
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_challenge_mismatch_is_403() {
    let (router, hub, client) = make_hub();
    client.on_challenge(
        "http://sub1/cb",
        ChallengeBehavior::Respond {
            status: 200,
            body: Bytes::from_static(b"nope"),
        },
    );

    let response = router.oneshot(intent_request(SUBSCRIBE_FORM)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(hub.registry().subscription_count(), 0);
}

#[tokio::test]
async fn test_declined_intent_is_403() {
    let (router, _hub, client) = make_hub();
    client.on_challenge("http://sub1/cb", ChallengeBehavior::EchoWithStatus(404));

    let response = router.oneshot(intent_request(SUBSCRIBE_FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unreachable_callback_is_502() {
    let (router, _hub, client) = make_hub();
    client.on_challenge(
        "http://sub1/cb",
        ChallengeBehavior::Fail(hub_core::TransportError::Connect("refused".into())),
    );

    let response = router.oneshot(intent_request(SUBSCRIBE_FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_verification_timeout_is_504() {
    let mut config = HubConfig::default();
    config.verification.timeout = Duration::from_millis(50);
    let (router, _hub, client) = make_hub_with_config(config);
    client.on_challenge("http://sub1/cb", ChallengeBehavior::Hang);

    let response = router.oneshot(intent_request(SUBSCRIBE_FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

// =============================================================================
// PUBLISH
// =============================================================================

#[tokio::test]
async fn test_publish_accepted_and_delivered() {
    let (router, _hub, client) = make_hub();
    router
        .clone()
        .oneshot(intent_request(SUBSCRIBE_FORM))
        .await
        .unwrap();

    let response = router
        .oneshot(publish_request("/publish?hub.topic=news", r#"{"id":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["topic"], "news");
    assert_eq!(json["subscribers"], 1);

    wait_for_deliveries(&client, 1).await;
    let delivery = &client.deliveries()[0];
    assert_eq!(&delivery.payload[..], br#"{"id":1}"#);
    assert_eq!(delivery.content_type, "application/json");
    assert_eq!(
        delivery.signature,
        "sha256=8027c363c5fcb0831619ae9eec3f9d673aa9f1d0e7b58eb5ca3cdade37721b78"
    );
}

#[tokio::test]
async fn test_publish_forwards_content_type() {
    let (router, hub, client) = make_hub();
    hub.registry().add("news", "http://sub1/cb", "s1");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/publish?hub.topic=news")
        .header(header::CONTENT_TYPE, "application/atom+xml")
        .body(Body::from("<feed/>"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_for_deliveries(&client, 1).await;
    assert_eq!(client.deliveries()[0].content_type, "application/atom+xml");
}

#[tokio::test]
async fn test_publish_without_topic_is_400() {
    let (router, _hub, client) = make_hub();

    for uri in ["/publish", "/publish?hub.topic="] {
        let response = router
            .clone()
            .oneshot(publish_request(uri, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
    }
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_publish_to_empty_topic_sends_nothing() {
    let (router, _hub, client) = make_hub();

    let response = router
        .oneshot(publish_request("/publish?hub.topic=nobody", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await["subscribers"], 0);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_oversized_payload_is_413() {
    let mut config = HubConfig::default();
    config.limits.max_payload_bytes = 16;
    let (router, hub, client) = make_hub_with_config(config);
    hub.registry().add("news", "http://sub1/cb", "s1");

    let response = router
        .oneshot(publish_request(
            "/publish?hub.topic=news",
            "this body is longer than sixteen bytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.deliveries().is_empty());
}

#[tokio::test]
async fn test_broadcast_reaches_all_topics() {
    let (router, hub, client) = make_hub();
    hub.registry().add("news", "http://a/cb", "s1");
    hub.registry().add("sports", "http://b/cb", "s2");

    let response = router
        .oneshot(publish_request("/publish/all", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["topics"], 2);
    assert_eq!(json["subscribers"], 2);

    wait_for_deliveries(&client, 2).await;
    assert_eq!(client.deliveries_to("http://a/cb").len(), 1);
    assert_eq!(client.deliveries_to("http://b/cb").len(), 1);
}

// =============================================================================
// ADMIN
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (router, _hub, _client) = make_hub();

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_topics_never_expose_secrets() {
    let (router, hub, _client) = make_hub();
    hub.registry().add("news", "http://sub1/cb", "top-secret");

    let request = Request::get("/topics").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("news"));
    assert!(!text.contains("top-secret"));
    assert!(!text.contains("sub1"));
}

#[tokio::test]
async fn test_metrics_after_failed_verification() {
    let (router, _hub, client) = make_hub();
    client.on_challenge("http://sub1/cb", ChallengeBehavior::EchoWithStatus(500));
    router
        .clone()
        .oneshot(intent_request(SUBSCRIBE_FORM))
        .await
        .unwrap();

    let request = Request::get("/metrics").body(Body::empty()).unwrap();
    let json = json_body(router.oneshot(request).await.unwrap()).await;

    assert_eq!(json["verifications"]["failed"], 1);
    assert_eq!(json["registry"]["subscriptions"], 0);
}
