//! Conditional GET: Last-Modified, ETag and request ids.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use common::{body_text, header_str, site};

const POST_URI: &str = "/post/2024/05/hello";

fn get_with(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::get(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_documents_carry_validators() {
    let site = site();
    let response = site.get(POST_URI).await;
    assert_eq!(response.status(), StatusCode::OK);

    let etag = header_str(&response, "etag").unwrap();
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert!(header_str(&response, "last-modified").unwrap().ends_with(" GMT"));
    assert_eq!(
        header_str(&response, "cache-control"),
        Some("must-revalidate, max-age=0")
    );
}

#[tokio::test]
async fn test_matching_etag_is_not_modified() {
    let site = site();
    let response = site.get(POST_URI).await;
    let etag = header_str(&response, "etag").unwrap().to_string();

    let response = site.send(get_with(POST_URI, header::IF_NONE_MATCH, &etag)).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(header_str(&response, "etag"), Some(etag.as_str()));
    assert_eq!(body_text(response).await, "");

    let response = site
        .send(get_with(POST_URI, header::IF_NONE_MATCH, "\"stale\""))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_etag_depends_on_the_request_url() {
    let site = site();
    let plain = site.get(POST_URI).await;
    let with_query = site.get(&format!("{POST_URI}?utm=1")).await;
    assert_ne!(header_str(&plain, "etag"), header_str(&with_query, "etag"));
}

#[tokio::test]
async fn test_if_modified_since() {
    let site = site();
    let response = site
        .send(get_with(
            POST_URI,
            header::IF_MODIFIED_SINCE,
            "Fri, 01 Jan 2100 00:00:00 GMT",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(header_str(&response, "last-modified").is_some());

    let response = site
        .send(get_with(
            POST_URI,
            header::IF_MODIFIED_SINCE,
            "Mon, 01 Jan 2001 00:00:00 GMT",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_not_found_page_is_never_cached() {
    let site = site();
    let response = site.get("/post/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header_str(&response, "etag").is_none());
    assert!(header_str(&response, "last-modified").is_none());
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let site = site();
    let response = site.get("/").await;
    let generated = header_str(&response, "x-request-id").unwrap();
    assert_eq!(generated.len(), 36);

    let response = site
        .send(get_with("/", header::HeaderName::from_static("x-request-id"), "abc-123"))
        .await;
    assert_eq!(header_str(&response, "x-request-id"), Some("abc-123"));
}
