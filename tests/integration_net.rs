// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for redirect resolution and fetching using wiremock.
//!
//! Covers:
//! - Direct success and relative redirect chains
//! - Cookie propagation across hops and into the download
//! - Hop budget exhaustion
//! - Error statuses ending the chain
//! - Skipping existing destinations and cleaning up failed downloads
//! - Bodies cut short by the server

use splines_build::error::{NetworkError, SplinesError};
use splines_build::net::{DownloadTarget, FetchOutcome, Fetcher, NetSettings, RedirectResolver};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn settings(max_hops: u32) -> NetSettings {
    NetSettings {
        max_hops,
        ..NetSettings::default()
    }
}

fn resolver(max_hops: u32) -> RedirectResolver {
    RedirectResolver::new(&settings(max_hops)).expect("client")
}

fn fetcher(max_hops: u32) -> Fetcher {
    Fetcher::from_resolver(resolver(max_hops)).silent()
}

fn redirect(to: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("Location", to)
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

fn network_error(err: &SplinesError) -> &NetworkError {
    err.as_network()
        .unwrap_or_else(|| panic!("expected a network error, got {err:?}"))
}

// =============================================================================
// RedirectResolver
// =============================================================================

#[tokio::test]
async fn test_resolve_success_returns_start_url() {
    let server = MockServer::start().await;
    mount(&server, "/file.tgz", ResponseTemplate::new(200), 1).await;

    let url = format!("{}/file.tgz", server.uri());
    let resolved = resolver(10).resolve(&url).await.unwrap();

    assert_eq!(resolved, url);
}

#[tokio::test]
async fn test_resolve_follows_relative_location() {
    let server = MockServer::start().await;
    mount(&server, "/a", redirect("/b"), 1).await;
    mount(&server, "/b", ResponseTemplate::new(200), 1).await;

    let resolved = resolver(10)
        .resolve(&format!("{}/a", server.uri()))
        .await
        .unwrap();

    assert_eq!(resolved, format!("{}/b", server.uri()));
}

#[tokio::test]
async fn test_resolve_chain_of_redirects() {
    let server = MockServer::start().await;
    for i in 0..4 {
        mount(&server, &format!("/hop{i}"), redirect(&format!("hop{}", i + 1)), 1).await;
    }
    mount(&server, "/hop4", ResponseTemplate::new(200), 1).await;

    let resolution = resolver(10)
        .resolve_detailed(&format!("{}/hop0", server.uri()))
        .await
        .unwrap();

    assert_eq!(resolution.url, format!("{}/hop4", server.uri()));
    assert_eq!(resolution.hops, 5);
    assert_eq!(resolution.cookie, None);
}

#[tokio::test]
async fn test_resolve_absolute_location_to_other_host() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    let target = format!("{}/pkg/v1.tar.gz", mirror.uri());
    mount(&origin, "/latest", redirect(&target), 1).await;
    mount(&mirror, "/pkg/v1.tar.gz", ResponseTemplate::new(200), 1).await;

    let resolved = resolver(10)
        .resolve(&format!("{}/latest", origin.uri()))
        .await
        .unwrap();

    assert_eq!(resolved, target);
}

#[tokio::test]
async fn test_resolve_cookie_carried_to_later_hops() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/login",
        redirect("/mirror").insert_header("Set-Cookie", "session=abc123; Path=/; HttpOnly"),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/mirror"))
        .and(header("cookie", "session=abc123"))
        .respond_with(redirect("/file"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = resolver(10)
        .resolve_detailed(&format!("{}/login", server.uri()))
        .await
        .unwrap();

    assert_eq!(resolution.url, format!("{}/file", server.uri()));
    assert_eq!(resolution.cookie.as_deref(), Some("session=abc123"));
}

#[tokio::test]
async fn test_resolve_sends_accept_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .and(header("accept", "*/*"))
        .and(header("user-agent", "splines-test/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settings = NetSettings {
        user_agent: "splines-test/1.0".to_string(),
        ..NetSettings::default()
    };
    let resolver = RedirectResolver::new(&settings).unwrap();

    resolver
        .resolve(&format!("{}/a", server.uri()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resolve_success_on_last_allowed_hop() {
    let server = MockServer::start().await;
    mount(&server, "/r0", redirect("/r1"), 1).await;
    mount(&server, "/r1", redirect("/r2"), 1).await;
    mount(&server, "/r2", ResponseTemplate::new(200), 1).await;

    let resolved = resolver(3)
        .resolve(&format!("{}/r0", server.uri()))
        .await
        .unwrap();

    assert_eq!(resolved, format!("{}/r2", server.uri()));
}

#[tokio::test]
async fn test_resolve_too_many_redirects() {
    let server = MockServer::start().await;
    mount(&server, "/r0", redirect("/r1"), 1).await;
    mount(&server, "/r1", redirect("/r2"), 1).await;
    mount(&server, "/r2", redirect("/r3"), 1).await;
    mount(&server, "/r3", ResponseTemplate::new(200), 0).await;

    let start = format!("{}/r0", server.uri());
    let err = resolver(3).resolve(&start).await.unwrap_err();

    match network_error(&err) {
        NetworkError::TooManyRedirects { url, max_hops } => {
            assert_eq!(url, &start);
            assert_eq!(*max_hops, 3);
        }
        other => panic!("expected TooManyRedirects, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_redirect_loop_exhausts_budget() {
    let server = MockServer::start().await;
    mount(&server, "/loop", redirect("/loop"), 4).await;

    let err = resolver(4)
        .resolve(&format!("{}/loop", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        network_error(&err),
        NetworkError::TooManyRedirects { max_hops: 4, .. }
    ));
}

#[tokio::test]
async fn test_resolve_error_status_stops_chain() {
    for status in [403_u16, 404, 500, 503] {
        let server = MockServer::start().await;
        mount(&server, "/a", redirect("/b"), 1).await;
        mount(
            &server,
            "/b",
            ResponseTemplate::new(status).set_body_string("denied"),
            1,
        )
        .await;
        mount(&server, "/c", ResponseTemplate::new(200), 0).await;

        let err = resolver(10)
            .resolve(&format!("{}/a", server.uri()))
            .await
            .unwrap_err();

        match network_error(&err) {
            NetworkError::UnexpectedStatus {
                status: got,
                url,
                body,
            } => {
                assert_eq!(*got, status);
                assert_eq!(url, &format!("{}/b", server.uri()));
                assert_eq!(body, "denied");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_resolve_redirect_without_location() {
    let server = MockServer::start().await;
    mount(&server, "/a", ResponseTemplate::new(302), 1).await;

    let err = resolver(10)
        .resolve(&format!("{}/a", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        network_error(&err),
        NetworkError::MissingLocation { status: 302, .. }
    ));
}

#[tokio::test]
async fn test_resolve_rejects_non_http_url() {
    let err = resolver(10)
        .resolve("ftp://example.test/file")
        .await
        .unwrap_err();

    assert!(matches!(network_error(&err), NetworkError::InvalidUrl(_)));
}

// =============================================================================
// Fetcher
// =============================================================================

#[tokio::test]
async fn test_fetch_follows_redirect_and_writes_body() {
    let server = MockServer::start().await;
    let dir = temp_dir();
    mount(&server, "/download", redirect("/files/pkg.tgz"), 1).await;
    // One request while resolving, one for the download.
    mount(
        &server,
        "/files/pkg.tgz",
        ResponseTemplate::new(200).set_body_bytes(b"archive bytes".to_vec()),
        2,
    )
    .await;

    let destination = dir.path().join("deps/pkg.tgz");
    let target = DownloadTarget::new(format!("{}/download", server.uri()), &destination);
    let outcome = fetcher(10).fetch(&target).await.unwrap();

    assert_eq!(
        outcome,
        FetchOutcome::Downloaded {
            url: format!("{}/files/pkg.tgz", server.uri()),
            bytes: 13,
        }
    );
    assert_eq!(std::fs::read(&destination).unwrap(), b"archive bytes");
}

#[tokio::test]
async fn test_fetch_forwards_cookie_to_download() {
    let server = MockServer::start().await;
    let dir = temp_dir();
    mount(
        &server,
        "/get",
        redirect("/blob").insert_header("Set-Cookie", "token=xyz"),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/blob"))
        .and(header("cookie", "token=xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
        .expect(2)
        .mount(&server)
        .await;

    let destination = dir.path().join("blob.bin");
    let target = DownloadTarget::new(format!("{}/get", server.uri()), &destination);
    fetcher(10).fetch(&target).await.unwrap();

    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "payload");
}

#[tokio::test]
async fn test_fetch_existing_destination_makes_no_request() {
    let server = MockServer::start().await;
    let dir = temp_dir();
    mount(&server, "/file", ResponseTemplate::new(200), 0).await;

    let destination = dir.path().join("file.tgz");
    std::fs::write(&destination, b"already here").unwrap();

    let target = DownloadTarget::new(format!("{}/file", server.uri()), &destination);
    let outcome = fetcher(10).fetch(&target).await.unwrap();

    assert_eq!(outcome, FetchOutcome::AlreadyExists);
    assert_eq!(std::fs::read(&destination).unwrap(), b"already here");
}

#[tokio::test]
async fn test_fetch_failed_resolution_leaves_no_file() {
    let server = MockServer::start().await;
    let dir = temp_dir();
    mount(&server, "/gone", ResponseTemplate::new(404), 1).await;

    let destination = dir.path().join("gone.tgz");
    let target = DownloadTarget::new(format!("{}/gone", server.uri()), &destination);
    let err = fetcher(10).fetch(&target).await.unwrap_err();

    assert!(matches!(
        network_error(&err),
        NetworkError::UnexpectedStatus { status: 404, .. }
    ));
    assert!(!destination.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_fetch_cancelled_before_start() {
    let server = MockServer::start().await;
    let dir = temp_dir();
    mount(&server, "/file", ResponseTemplate::new(200), 0).await;

    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();
    let destination = dir.path().join("file.tgz");
    let target = DownloadTarget::new(format!("{}/file", server.uri()), &destination);
    let err = fetcher(10)
        .with_cancel_token(token)
        .fetch(&target)
        .await
        .unwrap_err();

    assert!(matches!(network_error(&err), NetworkError::Interrupted));
    assert!(!destination.exists());
}

/// Serves every connection a response that promises 100 bytes, sends 5 and
/// hangs up.
async fn truncating_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response =
                    format!("HTTP/1.1 {status_line}\r\nContent-Length: 100\r\n\r\nshort");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_fetch_truncated_body_leaves_no_file() {
    let base = truncating_server("200 OK").await;
    let dir = temp_dir();

    let destination = dir.path().join("pkg.tgz");
    let target = DownloadTarget::new(format!("{base}/pkg.tgz"), &destination);
    let err = fetcher(10).fetch(&target).await.unwrap_err();

    assert!(matches!(network_error(&err), NetworkError::Reqwest(_)));
    assert!(!destination.exists());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[tokio::test]
async fn test_resolve_unreadable_error_body_keeps_status() {
    let base = truncating_server("500 Internal Server Error").await;

    let err = resolver(10)
        .resolve(&format!("{base}/broken"))
        .await
        .unwrap_err();

    match network_error(&err) {
        NetworkError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(*status, 500);
            assert!(body.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}
