// src/transport/http.rs
//! HTTP collector client
//!
//! Serializes chunks into the collection endpoint's wire shape and POSTs
//! them. Transient failures (5xx, connection errors) are retried with
//! exponential backoff before the error reaches the flusher, which then
//! requeues the chunk's events.

use crate::events::{Chunk, SessionMetadata};
use crate::transport::{CollectRequest, CollectResponse, Collector};
use crate::utils::errors::{RecorderError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

/// zstd level for chunk payloads; fast beats dense for interactive clients
const COMPRESSION_LEVEL: i32 = 1;

/// Bodies smaller than this go uncompressed
const MIN_COMPRESS_BYTES: usize = 1024;

/// Production collector over HTTP
pub struct HttpCollector {
    http_client: reqwest::Client,
    endpoint: String,
    compress: bool,
    max_retries: u32,
}

impl HttpCollector {
    /// Create a collector client
    ///
    /// `endpoint` must be an absolute URL; relative collection paths only
    /// make sense for in-browser deployments and have no meaning here.
    pub fn new(endpoint: &str, compress: bool) -> Result<Self> {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(RecorderError::Config(format!(
                "collection endpoint must be an absolute URL, got {:?}",
                endpoint
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RecorderError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            compress,
            max_retries: 2,
        })
    }

    async fn post(&self, request: &CollectRequest<'_>, compress: bool) -> Result<CollectResponse> {
        let body = serde_json::to_vec(request)?;

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let compressed = compress && body.len() > MIN_COMPRESS_BYTES;
        let payload = if compressed {
            let encoded = zstd::encode_all(body.as_slice(), COMPRESSION_LEVEL)
                .map_err(|e| RecorderError::Compression(e.to_string()))?;
            debug!(
                raw = body.len(),
                compressed = encoded.len(),
                "Compressed chunk payload"
            );
            builder = builder.header(CONTENT_ENCODING, HeaderValue::from_static("zstd"));
            encoded
        } else {
            body
        };

        let response = builder
            .body(payload)
            .send()
            .await
            .map_err(|e| RecorderError::Collector(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(RecorderError::Collector(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let parsed: CollectResponse = response
            .json()
            .await
            .map_err(|e| RecorderError::Collector(format!("failed to parse response: {}", e)))?;

        if !parsed.success {
            return Err(RecorderError::Collector(format!(
                "server rejected request: {}",
                parsed.error.as_deref().unwrap_or("no reason given")
            )));
        }
        Ok(parsed)
    }

    /// POST with retry on transient failures
    async fn post_with_retry(
        &self,
        request: &CollectRequest<'_>,
        compress: bool,
    ) -> Result<CollectResponse> {
        let mut delay = Duration::from_millis(500);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, "Retrying collection endpoint POST in {:?}", delay);
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }

            match self.post(request, compress).await {
                Ok(response) => return Ok(response),
                Err(e) if is_retryable(&e) => {
                    warn!("Transient collector error: {}", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RecorderError::Collector("max retries exceeded".to_string())))
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn start_session(&self, session_id: &str, metadata: &SessionMetadata) -> Result<()> {
        let request = CollectRequest::Start {
            session_id,
            metadata: Some(metadata),
        };
        self.post_with_retry(&request, false).await?;
        Ok(())
    }

    async fn send_chunk(&self, chunk: &Chunk) -> Result<()> {
        let request = CollectRequest::Events {
            session_id: &chunk.session_id,
            chunk_id: &chunk.chunk_id,
            chunk_index: chunk.index,
            events: &chunk.events,
            custom_events: &chunk.custom_events,
        };
        self.post_with_retry(&request, self.compress && chunk.compressed)
            .await?;
        debug!(
            chunk_id = %chunk.chunk_id,
            index = chunk.index,
            events = chunk.event_count(),
            "Delivered chunk"
        );
        Ok(())
    }

    async fn end_session(&self, session_id: &str, pages_visited: &[String]) -> Result<()> {
        let request = CollectRequest::End {
            session_id,
            pages_visited,
        };
        self.post_with_retry(&request, false).await?;
        Ok(())
    }
}

/// Transient errors worth retrying before the chunk goes back to the buffer
fn is_retryable(error: &RecorderError) -> bool {
    match error {
        RecorderError::Collector(msg) => {
            msg.contains("API error (5")
                || msg.contains("timeout")
                || msg.contains("connection")
                || msg.contains("request failed")
        }
        _ => false,
    }
}
