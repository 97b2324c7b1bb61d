//! End-to-end dispatch scenarios over a real loopback listener.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use fake_http_service::FakeHttpService;

mod common;

#[tokio::test]
async fn test_first_registration_wins() {
    let service = FakeHttpService::builder().start().await.unwrap();
    let widgets = service
        .on_request_described("path ends with /widgets", |req| {
            req.uri().path().ends_with("/widgets")
        })
        .respond_with(|sink| async move {
            sink.write_str("ok");
            Ok(())
        });
    let fallback = service.on_request_described("always", |_| true).fail();

    let res = common::client()
        .get(service.url_for("/api/widgets").unwrap())
        .send()
        .await
        .expect("fake service unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ok");
    assert!(widgets.is_matched());
    assert!(!fallback.is_matched());

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_catch_all_satisfies_strict_verification() {
    let service = FakeHttpService::builder().strict(true).start().await.unwrap();
    service.fail_on_unexpected_request();

    let res = common::client()
        .post(service.url_for("/anything").unwrap())
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unmatched_expectation_fails_verification() {
    let service = FakeHttpService::builder().strict(true).start().await.unwrap();
    let never = service
        .on_request_described("path == /never", |req| req.uri().path() == "/never")
        .succeed();

    let res = common::client()
        .get(service.url_for("/other").unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND.as_u16());
    assert!(!never.is_matched());

    let label = format!("FakeHttpService {}", service);
    let err = service.shutdown().await.unwrap_err();
    assert_eq!(err.descriptions, vec!["path == /never".to_string()]);
    assert_eq!(err.service, label);
    assert!(err.to_string().contains("path == /never"));
}

#[tokio::test]
async fn test_responder_failure_is_contained() {
    let service = FakeHttpService::builder().start().await.unwrap();
    service.responds(
        |_| true,
        |_sink| async { Err("boom".into()) },
    );

    let client = common::client();
    let res = client
        .get(service.url_for("/explode").unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().contains("boom"));

    // The service keeps serving after a failed responder
    let res = client
        .get(service.url_for("/again").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_predicates_see_method_headers_and_body() {
    let service = FakeHttpService::builder().strict(true).start().await.unwrap();
    service
        .on_request_described("POST /orders with json", |req| {
            req.method() == "POST"
                && req.headers().get("content-type").is_some_and(|v| v == "application/json")
                && req.body().as_ref() == br#"{"sku":"abc"}"#
        })
        .respond_with(|sink| async move {
            sink.set_status(StatusCode::CREATED);
            sink.write_json(&serde_json::json!({ "id": 1 }))?;
            Ok(())
        });

    let res = common::client()
        .post(service.url_for("/orders").unwrap())
        .header("content-type", "application/json")
        .body(r#"{"sku":"abc"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], 1);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_with_content_at_and_base_url() {
    let service = FakeHttpService::builder().start().await.unwrap();
    service.with_content_at("/greeting", "hello");
    service
        .on_request_described("redirect", |req| req.uri().path() == "/redirect")
        .respond_with_base(|sink, base| async move {
            sink.write_str(base.join("/greeting")?.as_str());
            Ok(())
        });

    let client = common::client();
    let greeting = client
        .get(service.url_for("/api/greeting").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(greeting.text().await.unwrap(), "hello");

    let redirect = client
        .get(service.url_for("/redirect").unwrap())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(redirect, service.url_for("/greeting").unwrap().as_str());

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let service = FakeHttpService::builder().start().await.unwrap();
    let slow_calls = Arc::new(AtomicUsize::new(0));
    let counter = slow_calls.clone();
    service
        .on_request_described("slow", |req| req.uri().path() == "/slow")
        .respond_with(move |sink| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                sink.write_str("slow");
                Ok(())
            }
        });
    service.with_content_at("/fast", "fast");

    let client = common::client();
    let slow = tokio::spawn({
        let client = client.clone();
        let url = service.url_for("/slow").unwrap();
        async move { client.get(url).send().await.unwrap().text().await.unwrap() }
    });

    // The fast request completes while the slow responder is still sleeping
    tokio::time::sleep(Duration::from_millis(20)).await;
    let fast = tokio::time::timeout(
        Duration::from_millis(150),
        client.get(service.url_for("/fast").unwrap()).send(),
    )
    .await
    .expect("fast request blocked by slow responder")
    .unwrap();
    assert_eq!(fast.text().await.unwrap(), "fast");

    assert_eq!(slow.await.unwrap(), "slow");
    assert_eq!(slow_calls.load(Ordering::SeqCst), 1);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_registration_while_serving() {
    let service = FakeHttpService::builder().start().await.unwrap();
    let client = common::client();

    let before = client
        .get(service.url_for("/late").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(before.status(), 404);

    service.with_content_at("/late", "now here");

    let after = client
        .get(service.url_for("/late").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), 200);
    assert_eq!(after.text().await.unwrap(), "now here");

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let service = FakeHttpService::builder()
        .body_limit_bytes(8)
        .start()
        .await
        .unwrap();
    service.fail_on_unexpected_request();

    let res = common::client()
        .post(service.url_for("/upload").unwrap())
        .body("0123456789abcdef")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_panicking_predicate_answers_internal_error() {
    let service = FakeHttpService::builder().start().await.unwrap();
    service
        .on_request_described("x-id == 1", |req| req.headers()["x-id"] == "1")
        .succeed();

    let client = common::client();
    let res = client
        .get(service.url_for("/a").unwrap())
        .send()
        .await
        .expect("connection dropped instead of answering");
    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().contains("predicate panicked"));

    // Requests carrying the header still reach the handler
    let res = client
        .get(service.url_for("/a").unwrap())
        .header("x-id", "1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    service.shutdown().await.unwrap();
}
