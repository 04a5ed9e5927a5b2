// tests/web_tests.rs

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use greenlit_core::Error;
use greenlit_core::test_utils::helpers::TestHarness;
use greenlit_core::web::webhook::signature_for;
use greenlit_core::web::{AppState, router};

const API_KEY: &str = "payhip-test-key";

fn state(h: &TestHarness) -> AppState {
    AppState::new(
        h.catalog.clone(),
        h.stores.ledger.clone(),
        h.stores.allow_lists.clone(),
        API_KEY,
    )
}

async fn send(state: AppState, req: Request<Body>) -> (StatusCode, String) {
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn webhook(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/payhip-webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_paid_webhook_fills_ledger() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let body = json!({
        "signature": signature_for(API_KEY),
        "type": "paid",
        "email": "buyer@example.com",
        "items": [
            { "product_key": "KEY-A", "product_name": "blasters" },
            { "product_key": "KEY-B", "product_name": "Ship System" },
            { "product_key": "KEY-C", "product_name": "Hoverboards" }
        ]
    });

    let (status, text) = send(state(&h), webhook(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "OK");

    let a = h.stores.ledger.get("KEY-A").await?.expect("KEY-A pending");
    assert_eq!(a.system, "Blasters");
    assert_eq!(a.email.as_deref(), Some("buyer@example.com"));
    assert!(h.stores.ledger.contains("KEY-B").await?);
    assert!(!h.stores.ledger.contains("KEY-C").await?);
    Ok(())
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let body = json!({
        "signature": signature_for("someone-else"),
        "type": "paid",
        "items": [{ "product_key": "KEY-A", "product_name": "Blasters" }]
    });

    let (status, text) = send(state(&h), webhook(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Invalid signature");
    assert_eq!(h.stores.ledger.len().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_webhook_ignores_other_events() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let body = json!({
        "signature": signature_for(API_KEY),
        "type": "refunded",
        "items": [{ "product_key": "KEY-A", "product_name": "Blasters" }]
    });

    let (status, text) = send(state(&h), webhook(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Ignored non-paid event");
    assert_eq!(h.stores.ledger.len().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_allow_list_endpoint() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, text) = send(state(&h), get("/whitelist/Hoverboards")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "No such system");

    let (status, text) = send(state(&h), get("/whitelist/blasters")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Whitelist file not found");

    let blasters = h.catalog.find("Blasters").unwrap();
    h.stores.allow_lists.add(blasters, "111").await?;
    h.stores.allow_lists.add(blasters, "222").await?;

    let resp = router(state(&h)).oneshot(get("/whitelist/BLASTERS")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    let body = to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"111\n222");

    // Ship System has a space; it must resolve when percent-encoded
    let ship = h.catalog.find("Ship System").unwrap();
    h.stores.allow_lists.add(ship, "333").await?;
    let (status, text) = send(state(&h), get("/whitelist/ship%20system")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "333");
    Ok(())
}
