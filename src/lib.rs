//! # report-sync
//!
//! Client library for asynchronous report APIs: request a server-side report
//! job, poll it to completion, download and decode the resulting document,
//! and emit records with incremental state checkpoints.
//!
//! ## Design Philosophy
//!
//! report-sync is designed to be:
//! - **Resilient** - Transient transport failures are retried with
//!   exponential backoff; permanent failures surface immediately
//! - **Incremental** - Sync windows are partitioned into slices with
//!   max-wins cursor checkpoints, so interrupted runs resume without re-reading
//! - **Format-agnostic** - CSV, tab-separated flat files, XML, JSON and
//!   fixed-width documents decode into one uniform record shape
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use report_sync::{Catalog, Config, Orchestrator, SyncMessage, SyncMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         base_url: "https://api.example.com".to_string(),
//!         marketplace_ids: vec!["MKT1".to_string()],
//!         start_date: "2023-01-01T00:00:00Z".parse()?,
//!         end_date: None,
//!         report_options: Default::default(),
//!         retry: Default::default(),
//!         poll: Default::default(),
//!         slicing: Default::default(),
//!     };
//!
//!     let catalog = Catalog::builtin();
//!     let spec = catalog
//!         .get("GET_SELLER_FEEDBACK_DATA")
//!         .cloned()
//!         .ok_or("unknown report type")?;
//!
//!     let orchestrator = Orchestrator::new(config, spec)?;
//!     let mut messages: Vec<SyncMessage> = Vec::new();
//!     orchestrator
//!         .sync(SyncMode::Incremental, None, &mut messages)
//!         .await?;
//!
//!     for message in messages {
//!         println!("{message:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Report type catalog and decode specs
pub mod catalog;
/// HTTP client for the report job API
pub mod client;
/// Configuration types
pub mod config;
/// Document decoding and date normalization
pub mod decode;
/// Error types
pub mod error;
/// Slice-incremental sync orchestration
pub mod orchestrator;
/// Report job polling state machine
pub mod poller;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types for the job protocol and sync output
pub mod types;

// Re-export commonly used types
pub use catalog::{Catalog, DEFAULT_CURSOR_FIELD, ReportSpec};
pub use client::ReportClient;
pub use config::{Config, PollConfig, RetryConfig, SlicePolicy};
pub use decode::{DocumentFormat, FixedColumn, decode, decompress_gzip};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, SyncMode};
pub use poller::JobPoller;
pub use retry::{IsRetryable, send_with_retry};
pub use types::{
    Compression, DocumentLocation, Job, JobStatus, Record, ReportRequest, SliceState, SliceWindow,
    SyncMessage, SyncSink, parse_timestamp,
};
