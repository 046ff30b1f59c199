//! Integration tests for `CatalogClient` using wiremock HTTP mocks.

use std::time::Duration;

use serde_json::json;
use shelfscan_catalog::{CatalogClient, CatalogError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CatalogClient {
    CatalogClient::with_base_url(base_url, Some("test-token"))
        .expect("client construction should not fail")
}

async fn mount_status(server: &MockServer, gtin: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/gtins/{gtin}.json")))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn lookup_returns_normalized_product() {
    let server = MockServer::start().await;

    let body = json!({
        "gtin": 7_891_000_315_507_u64,
        "description": "LEITE EM PO NINHO INTEGRAL 400G",
        "brand": { "name": "NINHO" },
        "thumbnail": "https://img.example/thumb.png",
        "gpc": { "description": "Leite em Pó" }
    });

    Mock::given(method("GET"))
        .and(path("/gtins/7891000315507.json"))
        .and(header("X-Cosmos-Token", "test-token"))
        .and(header("User-Agent", "Cosmos-API-Request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let product = client
        .lookup("7891000315507", &CancellationToken::new())
        .await
        .expect("lookup should succeed")
        .expect("product should be found");

    assert_eq!(product.identifier, "7891000315507");
    assert_eq!(product.name.as_deref(), Some("LEITE EM PO NINHO INTEGRAL 400G"));
    assert_eq!(product.brand.as_deref(), Some("NINHO"));
    assert_eq!(product.image_url.as_deref(), Some("https://img.example/thumb.png"));
    assert_eq!(product.category.as_deref(), Some("Leite em Pó"));
    assert!(product.description.is_none());
    assert_eq!(product.raw, body);
    assert!(!product.placeholder);
}

#[tokio::test]
async fn not_found_is_ok_none() {
    let server = MockServer::start().await;
    mount_status(&server, "012345678905", ResponseTemplate::new(404)).await;

    let client = test_client(&server.uri());
    let result = client
        .lookup("012345678905", &CancellationToken::new())
        .await;

    assert!(
        matches!(result, Ok(None)),
        "expected Ok(None), got: {result:?}"
    );
}

#[tokio::test]
async fn unauthorized_and_forbidden_are_auth_failures() {
    for status in [401_u16, 403] {
        let server = MockServer::start().await;
        mount_status(&server, "012345678905", ResponseTemplate::new(status)).await;

        let client = test_client(&server.uri());
        let result = client
            .lookup("012345678905", &CancellationToken::new())
            .await;

        assert!(
            matches!(result, Err(CatalogError::Unauthorized { status: s }) if s == status),
            "expected Unauthorized({status}), got: {result:?}"
        );
    }
}

#[tokio::test]
async fn too_many_requests_reports_retry_after() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "012345678905",
        ResponseTemplate::new(429).insert_header("Retry-After", "30"),
    )
    .await;

    let client = test_client(&server.uri());
    let err = client
        .lookup("012345678905", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            CatalogError::RateLimited {
                retry_after_secs: Some(30)
            }
        ),
        "got: {err:?}"
    );
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn rate_limit_without_retry_after_header() {
    let server = MockServer::start().await;
    mount_status(&server, "012345678905", ResponseTemplate::new(429)).await;

    let client = test_client(&server.uri());
    let err = client
        .lookup("012345678905", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::RateLimited {
            retry_after_secs: None
        }
    ));
}

#[tokio::test]
async fn server_error_is_unexpected_status_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gtins/012345678905.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .lookup("012345678905", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CatalogError::UnexpectedStatus { status: 503, .. }),
        "got: {err:?}"
    );
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "012345678905",
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let client = test_client(&server.uri());
    let err = client
        .lookup("012345678905", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CatalogError::Deserialize { .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn odd_optional_fields_still_yield_a_product() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "012345678905",
        ResponseTemplate::new(200).set_body_json(json!({
            "description": "Widget",
            "brand": "Acme",
            "images": [null, "https://img.example/a.png"]
        })),
    )
    .await;

    let client = test_client(&server.uri());
    let product = client
        .lookup("012345678905", &CancellationToken::new())
        .await
        .expect("lookup should succeed")
        .expect("product should be found");

    assert_eq!(product.name.as_deref(), Some("Widget"));
    assert!(product.brand.is_none());
    assert_eq!(product.image_url.as_deref(), Some("https://img.example/a.png"));
}

#[tokio::test]
async fn placeholder_mode_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = CatalogClient::with_base_url(&server.uri(), None).unwrap();
    let product = client
        .lookup("012345678905", &CancellationToken::new())
        .await
        .expect("placeholder lookup should succeed")
        .expect("placeholder should be returned");

    assert!(product.placeholder);
    assert_eq!(product.identifier, "012345678905");
    assert_eq!(product.name.as_deref(), Some("Product 012345678905"));
}

#[tokio::test]
async fn pre_cancelled_token_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let client = test_client(&server.uri());
    let result = client.lookup("012345678905", &cancel).await;
    assert!(matches!(result, Err(CatalogError::Cancelled)));
}

#[tokio::test]
async fn cancelling_mid_request_returns_cancelled() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "012345678905",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "description": "slow" }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let client = test_client(&server.uri());
    let started = std::time::Instant::now();
    let result = client.lookup("012345678905", &cancel).await;

    assert!(
        matches!(result, Err(CatalogError::Cancelled)),
        "got: {result:?}"
    );
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "cancellation should not wait for the delayed response"
    );
}
