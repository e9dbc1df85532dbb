// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogFormat, LogLevel};

#[test]
fn test_log_level_range() {
    assert_eq!(LogLevel::from_u8(0), Some(LogLevel::SILENT));
    assert_eq!(LogLevel::from_u8(6), Some(LogLevel::DUMP));
    assert_eq!(LogLevel::from_u8(7), None);
    assert!(LogLevel::new(9).is_err());
    assert_eq!(LogLevel::new(4).unwrap(), LogLevel::DEBUG);
}

#[test]
fn test_filter_strings_scope_dependencies() {
    let filters: Vec<_> = (0..=6)
        .filter_map(LogLevel::from_u8)
        .map(LogLevel::to_filter_string)
        .collect();
    insta::assert_debug_snapshot!(filters, @r#"
    [
        "off",
        "error",
        "warn",
        "warn,splines_build=info",
        "warn,splines_build=debug",
        "warn,splines_build=trace",
        "trace",
    ]
    "#);
}

#[test]
fn test_log_level_serde() {
    let level: LogLevel = serde_json::from_str("4").unwrap();
    assert_eq!(level, LogLevel::DEBUG);
    assert_eq!(serde_json::to_string(&LogLevel::TRACE).unwrap(), "5");
    assert!(serde_json::from_str::<LogLevel>("12").is_err());
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert_eq!(config.file_format(), LogFormat::Text);
    assert!(config.log_file().is_none());
}

#[test]
fn test_log_config_builder() {
    let config = LogConfig::builder()
        .with_console_level(LogLevel::WARN)
        .with_log_file("logs/out.jsonl".to_string())
        .with_file_format(LogFormat::Json)
        .build();
    assert_eq!(config.console_level(), LogLevel::WARN);
    assert_eq!(config.log_file(), Some("logs/out.jsonl"));
    assert_eq!(config.file_format(), LogFormat::Json);
}

#[test]
fn test_json_log_file_is_created_with_parents() {
    use tracing_subscriber::layer::SubscriberExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/nested/build.jsonl");
    let config = LogConfig::builder()
        .with_file_level(LogLevel::DEBUG)
        .with_file_format(LogFormat::Json)
        .build();

    let (layer, guard) = super::file_layer(&config, &path).unwrap();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!(dependency = "eigen", "processing dependency");
        tracing::trace!("not written at debug");
    });
    drop(guard);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "DEBUG");
    assert_eq!(lines[0]["fields"]["message"], "processing dependency");
    assert_eq!(lines[0]["fields"]["dependency"], "eigen");
}
