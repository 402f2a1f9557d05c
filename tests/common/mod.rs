//! Shared harness for end-to-end report stream tests

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use report_sync::{Config, PollConfig, Record, RetryConfig, SlicePolicy, SliceState, SyncMessage};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPORT_ID: &str = "6789087632";
pub const DOCUMENT_ID: &str = "report_document_id";

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

/// Whole-window config with millisecond-scale retry and poll delays
pub fn fast_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.to_string(),
        marketplace_ids: vec!["MKT1".to_string()],
        start_date: utc("2023-01-01T00:00:00Z"),
        end_date: Some(utc("2023-01-30T00:00:00Z")),
        report_options: Default::default(),
        retry: RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        poll: PollConfig {
            interval: Duration::from_millis(5),
            max_polls: 10,
        },
        slicing: SlicePolicy::WholeWindow,
    }
}

pub async fn mount_create(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(serde_json::json!({"reportId": REPORT_ID})),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, status: &str, with_document: bool) {
    let mut body = serde_json::json!({
        "reportId": REPORT_ID,
        "processingStatus": status,
    });
    if with_document {
        body["reportDocumentId"] = serde_json::json!(DOCUMENT_ID);
    }
    Mock::given(method("GET"))
        .and(path(format!("/reports/{REPORT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_document(server: &MockServer, compressed: bool) {
    let mut body = serde_json::json!({
        "reportDocumentId": DOCUMENT_ID,
        "url": format!("{}/download", server.uri()),
    });
    if compressed {
        body["compressionAlgorithm"] = serde_json::json!("GZIP");
    }
    Mock::given(method("GET"))
        .and(path(format!("/documents/{DOCUMENT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_download(server: &MockServer, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Mount the full create / poll / resolve / download happy path
pub async fn mount_happy_path(server: &MockServer, document_body: Vec<u8>, compressed: bool) {
    mount_create(server).await;
    mount_status(server, "DONE", true).await;
    mount_document(server, compressed).await;
    mount_download(server, document_body).await;
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use std::io::Write;
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

pub fn records(messages: &[SyncMessage]) -> Vec<&Record> {
    messages
        .iter()
        .filter_map(|m| match m {
            SyncMessage::Record(r) => Some(r),
            SyncMessage::State(_) => None,
        })
        .collect()
}

pub fn states(messages: &[SyncMessage]) -> Vec<&SliceState> {
    messages
        .iter()
        .filter_map(|m| match m {
            SyncMessage::State(s) => Some(s),
            SyncMessage::Record(_) => None,
        })
        .collect()
}
