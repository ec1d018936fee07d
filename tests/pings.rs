//! Trackbacks and webmentions.

mod common;

use axum::http::StatusCode;

use common::{body_text, header_str, site};

#[tokio::test]
async fn test_trackback_is_stored() {
    let site = site();
    let response = site
        .post_form(
            "/trackback/1",
            "url=http%3A%2F%2Fother.test%2Fentry&title=Reply&excerpt=Short&blog_name=Other",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), Some("text/xml; charset=UTF-8"));
    assert!(body_text(response).await.contains("<error>0</error>"));

    let comments = site.blog.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].trackback);
    assert_eq!(comments[0].author, "Other");
    assert_eq!(comments[0].site, "http://other.test/entry");
}

#[tokio::test]
async fn test_trackback_errors_are_xml() {
    let site = site();

    let body = body_text(site.get("/trackback/1").await).await;
    assert!(body.contains("<error>1</error>"));

    let response = site
        .post_form("/trackback/4", "url=http%3A%2F%2Fother.test%2Fentry")
        .await;
    assert!(body_text(response).await.contains("<error>1</error>"));

    let response = site.post_form("/trackback/1", "title=no+url").await;
    assert!(body_text(response).await.contains("<error>1</error>"));
    assert_eq!(site.blog.comment_count(), 0);
}

#[tokio::test]
async fn test_trackback_needs_a_numeric_id() {
    let site = site();
    let response = site.post_form("/trackback/abc", "url=http%3A%2F%2Fother.test").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webmention_is_accepted() {
    let site = site();
    let response = site
        .post_form(
            "/webmention",
            "source=http%3A%2F%2Fother.test%2Fa&target=http%3A%2F%2Fblog.test%2Fpost%2F2024%2F05%2Fhello",
        )
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let comments = site.blog.comments_for(1);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author, "other.test");
}

#[tokio::test]
async fn test_webmention_rejects_bad_targets() {
    let site = site();
    for body in [
        "source=http%3A%2F%2Fother.test%2Fa",
        "source=http%3A%2F%2Fother.test%2Fa&target=http%3A%2F%2Felsewhere.test%2Fpost%2Fx",
        "source=http%3A%2F%2Fblog.test%2Fpost%2Fclosed&target=http%3A%2F%2Fblog.test%2Fpost%2Fclosed",
        "source=http%3A%2F%2Fother.test%2Fa&target=http%3A%2F%2Fblog.test%2Fpost%2Fclosed",
    ] {
        let response = site.post_form("/webmention", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(site.blog.comment_count(), 0);
}
