//! Slice-incremental sync orchestration
//!
//! The orchestrator partitions the configured sync window into slices, runs
//! the job poller once per slice in order, stamps records with the cursor
//! field in incremental mode, and emits max-wins state checkpoints. It is the
//! aggregation boundary for per-slice job failures: FATAL jobs do not abort
//! the run; their slices are collected and raised together as one
//! configuration error after all slices were attempted.

use crate::catalog::ReportSpec;
use crate::client::ReportClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::poller::JobPoller;
use crate::types::{
    Record, ReportRequest, SliceState, SliceWindow, SyncMessage, SyncSink, parse_timestamp,
};
use chrono::{DateTime, Utc};

/// Whether records are re-read from scratch or tracked against a cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Read everything in the window; no cursor stamping
    FullRefresh,
    /// Stamp every record with the cursor field and advance the checkpoint
    Incremental,
}

/// Runs one report stream sync end to end.
///
/// Independent streams may run concurrently as independent `Orchestrator`
/// instances; no state is shared between them.
#[derive(Clone, Debug)]
pub struct Orchestrator {
    client: ReportClient,
    spec: ReportSpec,
    config: Config,
}

impl Orchestrator {
    /// Create an orchestrator for `spec` against the API in `config`
    pub fn new(config: Config, spec: ReportSpec) -> Result<Self> {
        let client = ReportClient::new(&config.base_url, config.retry.clone())?;
        Ok(Self { client, spec, config })
    }

    /// Create an orchestrator reusing an existing client (e.g. one carrying
    /// authentication headers)
    pub fn with_client(client: ReportClient, config: Config, spec: ReportSpec) -> Self {
        Self { client, spec, config }
    }

    /// Run the sync, emitting records and state checkpoints into `sink`.
    ///
    /// Slices are processed strictly sequentially. A state checkpoint is
    /// emitted after each completed slice, and a terminal state message is
    /// always emitted, even with zero slices processed or on the error path;
    /// if no progress was made it echoes the prior cursor value.
    pub async fn sync(
        &self,
        mode: SyncMode,
        prior_state: Option<SliceState>,
        sink: &mut dyn SyncSink,
    ) -> Result<()> {
        let end = self.config.end_date.unwrap_or_else(Utc::now);
        let slices = SliceWindow::split(self.config.slicing, self.config.start_date, end);
        tracing::info!(
            report_type = %self.spec.report_type,
            slices = slices.len(),
            "Starting report stream sync"
        );

        let prior_value = prior_state.map(|s| s.cursor_value);
        let initial_cursor = prior_value.as_deref().and_then(parse_timestamp);
        let mut cursor = initial_cursor;

        let run = self.run_slices(mode, &slices, &mut cursor, sink).await;

        // Terminal state is emitted unconditionally, also when `run` failed
        let final_value = if cursor == initial_cursor {
            prior_value.unwrap_or_else(|| self.config.start_date.to_rfc3339())
        } else {
            self.checkpoint_value(cursor)
        };
        sink.emit(SyncMessage::State(SliceState {
            cursor_field: self.spec.cursor_field.clone(),
            cursor_value: final_value,
        }));

        let failed = run?;
        if !failed.is_empty() {
            let windows = failed
                .iter()
                .map(SliceWindow::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::config(format!(
                "At least one job could not be completed for slice {windows}"
            )));
        }
        Ok(())
    }

    /// Process all slices in order, returning the windows whose jobs failed
    /// with FATAL status. Any other error aborts the run immediately.
    async fn run_slices(
        &self,
        mode: SyncMode,
        slices: &[SliceWindow],
        cursor: &mut Option<DateTime<Utc>>,
        sink: &mut dyn SyncSink,
    ) -> Result<Vec<SliceWindow>> {
        let poller = JobPoller::new(&self.client, self.config.poll.clone());
        let mut failed = Vec::new();

        for slice in slices {
            let request = self.request_for(*slice);
            match poller.run(&self.spec, &request).await {
                Ok(records) => {
                    let mut slice_max = *cursor;
                    for mut record in records {
                        if mode == SyncMode::Incremental {
                            self.stamp_cursor(&mut record, *slice);
                            if let Some(observed) = record
                                .get(&self.spec.cursor_field)
                                .and_then(|v| v.as_str())
                                .and_then(parse_timestamp)
                            {
                                slice_max =
                                    Some(slice_max.map_or(observed, |max| max.max(observed)));
                            }
                        }
                        sink.emit(SyncMessage::Record(record));
                    }
                    // The cursor advances only once the slice fully completed
                    *cursor = slice_max;
                    sink.emit(SyncMessage::State(SliceState {
                        cursor_field: self.spec.cursor_field.clone(),
                        cursor_value: self.checkpoint_value(*cursor),
                    }));
                }
                Err(e @ Error::JobFailed { .. }) => {
                    tracing::error!(
                        report_type = %self.spec.report_type,
                        slice = %slice,
                        error = %e,
                        "Report job failed for slice, continuing with remaining slices"
                    );
                    failed.push(*slice);
                }
                Err(other) => return Err(other),
            }
        }

        Ok(failed)
    }

    fn request_for(&self, slice: SliceWindow) -> ReportRequest {
        ReportRequest {
            report_type: self.spec.report_type.clone(),
            marketplace_ids: self.config.marketplace_ids.clone(),
            report_options: if self.config.report_options.is_empty() {
                None
            } else {
                Some(self.config.report_options.clone())
            },
            data_start_time: Some(slice.start),
            data_end_time: Some(slice.end),
        }
    }

    /// Records missing the cursor field get the slice's effective end time
    fn stamp_cursor(&self, record: &mut Record, slice: SliceWindow) {
        if !record.contains_key(&self.spec.cursor_field) {
            record.insert(
                self.spec.cursor_field.clone(),
                serde_json::Value::String(slice.end.to_rfc3339()),
            );
        }
    }

    fn checkpoint_value(&self, cursor: Option<DateTime<Utc>>) -> String {
        cursor
            .map(|c| c.to_rfc3339())
            .unwrap_or_else(|| self.config.start_date.to_rfc3339())
    }
}
