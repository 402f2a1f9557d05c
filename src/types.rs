//! Core types for the report job protocol and sync output

use crate::config::SlicePolicy;
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A decoded report record: ordered mapping of field name to value.
///
/// Backed by `serde_json::Map`, which preserves insertion order with the
/// `preserve_order` feature enabled, so fields come out in document order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A report generation request. Immutable once submitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Platform report type identifier (e.g. `GET_SELLER_FEEDBACK_DATA`)
    pub report_type: String,

    /// Marketplace / tenant scope for the report
    pub marketplace_ids: Vec<String>,

    /// Vendor-specific report options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_options: Option<BTreeMap<String, String>>,

    /// Start of the data window covered by the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_start_time: Option<DateTime<Utc>>,

    /// End of the data window covered by the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_end_time: Option<DateTime<Utc>>,
}

/// Processing status of a server-side report job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Queued, not yet started
    InQueue,
    /// Generation in progress
    InProgress,
    /// Completed; a document is available
    Done,
    /// Cancelled by the platform or the requester; terminal, no document
    Cancelled,
    /// Failed permanently; terminal, no document
    Fatal,
}

impl JobStatus {
    /// True for DONE, CANCELLED and FATAL
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Cancelled | JobStatus::Fatal)
    }
}

/// A server-side report generation job, as seen through poll responses
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Platform-assigned job identifier
    #[serde(rename = "reportId")]
    pub id: String,

    /// Current processing status
    pub processing_status: JobStatus,

    /// Identifier of the generated document; present only once DONE
    #[serde(default, rename = "reportDocumentId")]
    pub document_id: Option<String>,
}

/// Compression applied to a report document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compression {
    /// Gzip-compressed document body
    Gzip,
}

/// Where to fetch a completed report document, produced once per DONE job
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLocation {
    /// Pre-resolved download URL
    pub url: String,

    /// Compression applied to the document body, if any
    #[serde(default, rename = "compressionAlgorithm")]
    pub compression: Option<Compression>,
}

/// A bounded time sub-range of the overall sync window, processed as one
/// independent report job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceWindow {
    /// Inclusive start of the slice
    pub start: DateTime<Utc>,
    /// Exclusive end of the slice
    pub end: DateTime<Utc>,
}

impl SliceWindow {
    /// Partition `[start, end)` into slices according to `policy`.
    ///
    /// Boundaries are aligned to the raw window, not to calendar midnight:
    /// the first slice always begins at `start` and the last always ends at
    /// `end`. An empty or inverted window yields no slices.
    pub fn split(policy: SlicePolicy, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<SliceWindow> {
        if start >= end {
            return Vec::new();
        }
        match policy {
            SlicePolicy::WholeWindow => vec![SliceWindow { start, end }],
            SlicePolicy::Daily => {
                let mut slices = Vec::new();
                let mut cursor = start;
                while cursor < end {
                    let next = (cursor + chrono::Duration::days(1)).min(end);
                    slices.push(SliceWindow {
                        start: cursor,
                        end: next,
                    });
                    cursor = next;
                }
                slices
            }
            SlicePolicy::Monthly => {
                let mut slices = Vec::new();
                let mut cursor = start;
                while cursor < end {
                    let next = cursor
                        .checked_add_months(Months::new(1))
                        .unwrap_or(end)
                        .min(end);
                    slices.push(SliceWindow {
                        start: cursor,
                        end: next,
                    });
                    cursor = next;
                }
                slices
            }
        }
    }
}

impl fmt::Display for SliceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{start_time: '{}', end_time: '{}'}}",
            self.start.to_rfc3339(),
            self.end.to_rfc3339()
        )
    }
}

/// Persisted incremental sync checkpoint for one stream.
///
/// `cursor_value` is updated max-wins as slices complete and never decreases
/// within a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceState {
    /// The record attribute used to track incremental progress
    pub cursor_field: String,
    /// Highest cursor value observed so far, as a timestamp string
    pub cursor_value: String,
}

/// One element of the ordered sync output stream
#[derive(Clone, Debug, PartialEq)]
pub enum SyncMessage {
    /// A decoded (and, in incremental mode, cursor-stamped) record
    Record(Record),
    /// A state checkpoint, emitted after each completed slice and once at the
    /// very end of the sync
    State(SliceState),
}

/// Receives the ordered stream of records and state checkpoints.
///
/// Implemented for `Vec<SyncMessage>` so tests and simple callers can collect
/// output in memory; production callers forward messages downstream.
pub trait SyncSink {
    /// Accept the next message in the stream
    fn emit(&mut self, message: SyncMessage);
}

impl SyncSink for Vec<SyncMessage> {
    fn emit(&mut self, message: SyncMessage) {
        self.push(message);
    }
}

/// Parse a cursor timestamp leniently.
///
/// Record cursor values and persisted state may use different formats
/// (RFC 3339, naive datetime, bare date), so comparison is done on parsed
/// instants rather than strings. Bare dates parse as midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}
