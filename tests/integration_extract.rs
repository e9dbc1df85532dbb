// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for archive extraction and the `deps` pipeline.
//!
//! Archives are built in memory with `tar` + `flate2` and served by wiremock
//! where a download is involved.

use std::path::Path;
use std::sync::Arc;

use flate2::Compression;
use flate2::write::GzEncoder;
use splines_build::cli::net::DepsArgs;
use splines_build::cmd::deps::{run_deps_command, select_dependencies};
use splines_build::config::Config;
use splines_build::config::types::{DependencyConfig, UnknownEntryPolicy};
use splines_build::tools::extractor::ExtractorTool;
use splines_build::tools::{Tool, ToolContext};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn ctx(config: Config) -> ToolContext {
    ToolContext::new(Arc::new(config), CancellationToken::new(), false)
}

fn dependency(name: &str, url: String, file: &Path, extract_to: Option<&Path>) -> DependencyConfig {
    DependencyConfig {
        name: name.to_string(),
        url,
        mirrors: Vec::new(),
        file: file.to_path_buf(),
        extract_to: extract_to.map(Path::to_path_buf),
    }
}

// =============================================================================
// ExtractorTool
// =============================================================================

#[tokio::test]
async fn extract_tar_gz_through_tool() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("eigen-3.4.0.tar.gz");
    std::fs::write(
        &archive,
        tar_gz(&[
            ("eigen-3.4.0/Eigen/Core", "// core"),
            ("eigen-3.4.0/CMakeLists.txt", "project(eigen)"),
        ]),
    )
    .unwrap();
    let out = dir.path().join("third_party");

    ExtractorTool::new()
        .archive(&archive)
        .output(&out)
        .run(&ctx(Config::default()))
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(out.join("eigen-3.4.0/Eigen/Core")).unwrap(),
        "// core"
    );
    assert!(out.join("eigen-3.4.0/CMakeLists.txt").is_file());
}

#[tokio::test]
async fn extract_skips_after_success_until_forced() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("pkg.tgz");
    std::fs::write(&archive, tar_gz(&[("pkg/a.txt", "one")])).unwrap();
    let out = dir.path().join("out");
    let ctx = ctx(Config::default());
    let tool = ExtractorTool::new().archive(&archive).output(&out);

    tool.run(&ctx).await.unwrap();
    std::fs::write(out.join("pkg/a.txt"), "edited").unwrap();

    tool.run(&ctx).await.unwrap();
    assert_eq!(std::fs::read_to_string(out.join("pkg/a.txt")).unwrap(), "edited");

    tool.clone().force(true).run(&ctx).await.unwrap();
    assert_eq!(std::fs::read_to_string(out.join("pkg/a.txt")).unwrap(), "one");
}

#[tokio::test]
async fn extract_strict_policy_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("fifo.tar");

    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Fifo);
    header.set_size(0);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "pkg/pipe", std::io::empty())
        .unwrap();
    std::fs::write(&archive, builder.into_inner().unwrap()).unwrap();

    let mut config = Config::default();
    config.extract.unknown_entries = UnknownEntryPolicy::Fail;

    let err = ExtractorTool::new()
        .archive(&archive)
        .output(dir.path().join("out"))
        .run(&ctx(config))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("pkg/pipe"));

    ExtractorTool::new()
        .archive(&archive)
        .output(dir.path().join("lenient"))
        .unknown_entries(UnknownEntryPolicy::Warn)
        .run(&ctx(Config::default()))
        .await
        .unwrap();
}

// =============================================================================
// deps pipeline
// =============================================================================

#[tokio::test]
async fn deps_download_through_redirect_and_extract() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let body = tar_gz(&[("gtest/include/gtest.h", "#pragma once")]);

    Mock::given(method("GET"))
        .and(path("/archive/latest"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/files/gtest.tgz"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/gtest.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let file = dir.path().join("downloads/gtest.tgz");
    let out = dir.path().join("third_party");
    let mut config = Config::default();
    config.deps.push(dependency(
        "googletest",
        format!("{}/archive/latest", server.uri()),
        &file,
        Some(&out),
    ));

    run_deps_command(&DepsArgs::default(), &config, CancellationToken::new())
        .await
        .unwrap();

    assert!(file.is_file());
    assert_eq!(
        std::fs::read_to_string(out.join("gtest/include/gtest.h")).unwrap(),
        "#pragma once"
    );
}

#[tokio::test]
async fn deps_second_run_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/eigen.tgz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(tar_gz(&[("eigen/Core", "core")])),
        )
        // Resolution and download of the first run only.
        .expect(2)
        .mount(&server)
        .await;

    let file = dir.path().join("eigen.tgz");
    let out = dir.path().join("ext");
    let mut config = Config::default();
    config.deps.push(dependency(
        "eigen",
        format!("{}/eigen.tgz", server.uri()),
        &file,
        Some(&out),
    ));

    for _ in 0..2 {
        run_deps_command(&DepsArgs::default(), &config, CancellationToken::new())
            .await
            .unwrap();
    }
    assert!(out.join("eigen/Core").is_file());
}

#[tokio::test]
async fn deps_falls_back_to_mirror() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/primary.tgz"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mirror.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("mirror bytes"))
        .mount(&server)
        .await;

    let file = dir.path().join("pkg.tgz");
    let mut dep = dependency("pkg", format!("{}/primary.tgz", server.uri()), &file, None);
    dep.mirrors.push(format!("{}/mirror.tgz", server.uri()));
    let mut config = Config::default();
    config.deps.push(dep);

    run_deps_command(&DepsArgs::default(), &config, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&file).unwrap(), "mirror bytes");
}

#[tokio::test]
async fn deps_unknown_name_fails_before_any_request() {
    let mut config = Config::default();
    config.deps.push(dependency(
        "eigen",
        "http://127.0.0.1:9/eigen.tgz".to_string(),
        Path::new("eigen.tgz"),
        None,
    ));

    let args = DepsArgs {
        names: vec!["boost".to_string()],
        ..DepsArgs::default()
    };
    let err = run_deps_command(&args, &config, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unknown dependency 'boost' (configured: eigen)"
    );
    assert_eq!(select_dependencies(&config, &[]).unwrap().len(), 1);
}

#[tokio::test]
async fn deps_dry_run_touches_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = dir.path().join("pkg.tgz");
    let out = dir.path().join("out");
    let mut config = Config::default();
    config.global.dry = true;
    config.deps.push(dependency(
        "pkg",
        format!("{}/pkg.tgz", server.uri()),
        &file,
        Some(&out),
    ));

    run_deps_command(&DepsArgs::default(), &config, CancellationToken::new())
        .await
        .unwrap();

    assert!(!file.exists());
    assert!(!out.exists());
}
