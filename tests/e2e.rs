//! A real listener driven over TCP.

mod common;

use std::time::Duration;

use blog_front::lifecycle::boot;
use blog_front::{HttpServer, Shutdown};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_serves_over_tcp_and_shuts_down() {
    let site = common::site();
    // Reuse the fixture theme; the bundled store starts empty.
    let mut config = site.config.clone();
    config.blog.data_file = None;

    let front = boot(&config, None).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, front);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "HOME page=1 lang= first=");

    let response = reqwest::get(format!("http://{addr}/files/style.css")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = reqwest::get(format!("http://{addr}/category/rust")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
