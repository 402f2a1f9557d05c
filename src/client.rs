//! HTTP transport for the report job protocol
//!
//! Wraps every outbound call in retry with exponential backoff (see
//! [`crate::retry`]) and classifies failures: 500/502/503/504 and
//! connection-level errors are retried up to the attempt ceiling, after which
//! they surface as a configuration-category error ("Giving up after N tries").
//! Non-retryable 4xx responses (403, structured 400 bodies) are classified as
//! configuration errors immediately, with the server's error message carried
//! verbatim for operator diagnosis.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::retry::{IsRetryable, send_with_retry};
use crate::types::{DocumentLocation, Job, ReportRequest};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct CreateReportResponse {
    #[serde(rename = "reportId")]
    report_id: String,
}

/// Structured error body returned with 400 responses:
/// `{"errors": [{"code", "message", "details"}]}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[allow(dead_code)]
    code: String,
    message: String,
}

/// Authenticated client for the three-call report protocol plus document
/// download. Token acquisition is the caller's concern; pass a pre-configured
/// `reqwest::Client` carrying default headers if the API requires them.
#[derive(Clone, Debug)]
pub struct ReportClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryConfig,
}

impl ReportClient {
    /// Create a client against `base_url` with the given retry policy
    pub fn new(base_url: &str, retry: RetryConfig) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), base_url, retry)
    }

    /// Create a client reusing an externally configured `reqwest::Client`
    /// (e.g. one carrying authentication headers)
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        retry: RetryConfig,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(Self { http, base_url, retry })
    }

    /// Submit a report generation request, returning the new job id
    pub async fn create_report(&self, request: &ReportRequest) -> Result<String> {
        let url = self.endpoint("reports")?;
        let response: CreateReportResponse = self
            .send_json("create_report", "POST", &url, || {
                self.http.post(url.clone()).json(request)
            })
            .await?;
        Ok(response.report_id)
    }

    /// Poll the current status of a report job
    pub async fn get_report(&self, report_id: &str) -> Result<Job> {
        let url = self.endpoint(&format!("reports/{report_id}"))?;
        self.send_json("get_report", "GET", &url, || self.http.get(url.clone()))
            .await
    }

    /// Resolve the download location for a completed job's document
    pub async fn get_document(&self, document_id: &str) -> Result<DocumentLocation> {
        let url = self.endpoint(&format!("documents/{document_id}"))?;
        self.send_json("get_document", "GET", &url, || self.http.get(url.clone()))
            .await
    }

    /// Fetch the raw (possibly gzip-compressed) document bytes from a
    /// pre-resolved URL
    pub async fn download_document(&self, document_url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(document_url)
            .map_err(|e| Error::config(format!("invalid document URL '{document_url}': {e}")))?;

        self.with_giveup("download_document", || {
            let builder = self.http.get(url.clone());
            let url = url.clone();
            async move {
                let response = builder.send().await?;
                let response = classify("GET", url.as_str(), response).await?;
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| Error::config(format!("invalid endpoint '{joined}': {e}")))
    }

    async fn send_json<T, F>(&self, operation: &str, method: &str, url: &Url, build: F) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        self.with_giveup(operation, || {
            let builder = build();
            let method = method.to_string();
            let url = url.clone();
            async move {
                let response = builder.send().await?;
                let response = classify(&method, url.as_str(), response).await?;
                Ok(response.json::<T>().await?)
            }
        })
        .await
    }

    /// Run `operation` through the retry layer; if retries are exhausted on a
    /// transient error, reclassify it as a configuration-category error so the
    /// caller sees "Giving up ... after N tries" instead of a raw 5xx.
    async fn with_giveup<T, F, Fut>(&self, operation: &str, build: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        match send_with_retry(&self.retry, build).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_retryable() => Err(Error::config(format!(
                "Giving up {operation}(...) after {} tries: {e}",
                self.retry.total_tries()
            ))),
            Err(e) => Err(e),
        }
    }
}

/// Map a response to either itself (success), a retryable [`Error::Http`]
/// (server-side failure statuses) or an immediate configuration error
/// (non-retryable 4xx)
async fn classify(
    method: &str,
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    match code {
        500 | 502 | 503 | 504 => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Http {
                status: code,
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("server error").to_string()
                } else {
                    body
                },
            })
        }
        403 => Err(Error::config(
            "Forbidden. You don't have permission to access this resource.",
        )),
        400 => {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.errors.into_iter().next())
                .map(|detail| detail.message)
                .unwrap_or(body);
            Err(Error::config(format!(
                "'{method}' request to '{url}' failed with status code '400' and \
                 error message: '{message}'."
            )))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::config(format!(
                "'{method}' request to '{url}' failed with status code '{code}': {body}"
            )))
        }
    }
}
