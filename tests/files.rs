//! Sandboxed public files.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use common::{body_text, header_str, site};

#[tokio::test]
async fn test_theme_file_is_served_with_cache_headers() {
    let site = site();
    let response = site.get("/files/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), Some("text/css"));
    assert!(header_str(&response, "last-modified").is_some());
    assert_eq!(
        header_str(&response, "cache-control"),
        Some("must-revalidate, max-age=604800")
    );
    assert_eq!(body_text(response).await, "body { color: black; }");
}

#[tokio::test]
async fn test_nested_and_module_files() {
    let site = site();
    let response = site.get("/files/img/logo.svg").await;
    assert_eq!(header_str(&response, "content-type"), Some("image/svg+xml"));

    let response = site.get("/files/plugins/gallery/gallery.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), Some("application/javascript"));
    assert_eq!(body_text(response).await, "console.log(1);");
}

#[tokio::test]
async fn test_rejected_files_are_plain_not_found() {
    let site = site();
    for uri in [
        "/files/notes.php",
        "/files/../secret.txt",
        "/files/%2e%2e/secret.txt",
        "/files/missing.css",
        "/files/img",
    ] {
        let response = site.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_text(response).await, "NOT FOUND route=404", "{uri}");
    }
}

#[tokio::test]
async fn test_unchanged_file_is_not_modified() {
    let site = site();
    let request = Request::get("/files/style.css")
        .header(header::IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT")
        .body(Body::empty())
        .unwrap();
    let response = site.send(request).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(body_text(response).await, "");
}
