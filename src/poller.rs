//! Job poller: drives one report job from submission to decoded records
//!
//! The poller owns the create → poll → resolve → download → decode sequence
//! for a single job. Each network step goes through the retrying transport
//! individually, so a transient failure on any one call is retried in place
//! without restarting the whole job.

use crate::catalog::ReportSpec;
use crate::client::ReportClient;
use crate::config::PollConfig;
use crate::decode::{decode, decompress_gzip};
use crate::error::{Error, Result};
use crate::types::{Compression, Job, JobStatus, Record, ReportRequest};

/// Drives the create/poll/resolve/download state machine for report jobs
#[derive(Clone, Debug)]
pub struct JobPoller<'a> {
    client: &'a ReportClient,
    poll: PollConfig,
}

impl<'a> JobPoller<'a> {
    /// Create a poller using `client` for all network calls
    pub fn new(client: &'a ReportClient, poll: PollConfig) -> Self {
        Self { client, poll }
    }

    /// Run one report job and return its decoded records.
    ///
    /// Terminal status handling:
    /// - `DONE` resolves and downloads the document, then decodes it
    /// - `CANCELLED` logs a warning and returns an empty record set; the
    ///   surrounding sync continues as success
    /// - `FATAL` fails with [`Error::JobFailed`] carrying the request's time
    ///   window
    pub async fn run(&self, spec: &ReportSpec, request: &ReportRequest) -> Result<Vec<Record>> {
        let report_id = self.client.create_report(request).await?;
        tracing::info!(
            report_type = %request.report_type,
            report_id = %report_id,
            "Report job submitted"
        );

        let job = self.wait_for_terminal(&report_id).await?;
        match job.processing_status {
            JobStatus::Done => {}
            JobStatus::Cancelled => {
                tracing::warn!(
                    report_type = %request.report_type,
                    report_id = %report_id,
                    "Report job was cancelled, continuing with no records"
                );
                return Ok(Vec::new());
            }
            JobStatus::Fatal => {
                return Err(Error::JobFailed {
                    report_type: request.report_type.clone(),
                    start_time: request
                        .data_start_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                    end_time: request
                        .data_end_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                });
            }
            // wait_for_terminal only returns terminal statuses
            JobStatus::InQueue | JobStatus::InProgress => unreachable!(),
        }

        // Invariant: DONE implies a document id
        let document_id = job.document_id.ok_or_else(|| {
            Error::config(format!(
                "report job '{report_id}' completed without a document id"
            ))
        })?;

        let location = self.client.get_document(&document_id).await?;
        let bytes = self.client.download_document(&location.url).await?;
        let bytes = match location.compression {
            Some(Compression::Gzip) => decompress_gzip(&bytes)?,
            None => bytes,
        };

        let records = decode(&bytes, &spec.format, &spec.date_fields)?;
        tracing::info!(
            report_type = %request.report_type,
            report_id = %report_id,
            records = records.len(),
            "Report document decoded"
        );
        Ok(records)
    }

    /// Poll job status on a fixed interval until it reaches a terminal state
    async fn wait_for_terminal(&self, report_id: &str) -> Result<Job> {
        let mut polls = 0;
        loop {
            let job = self.client.get_report(report_id).await?;
            if job.processing_status.is_terminal() {
                return Ok(job);
            }
            polls += 1;
            if polls >= self.poll.max_polls {
                return Err(Error::config(format!(
                    "report job '{report_id}' did not reach a terminal status after {} status checks",
                    self.poll.max_polls
                )));
            }
            tracing::debug!(
                report_id = %report_id,
                status = ?job.processing_status,
                poll = polls,
                "Report job still in progress"
            );
            tokio::time::sleep(self.poll.interval).await;
        }
    }
}
