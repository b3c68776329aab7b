// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of event batches to the log-analysis endpoint.
//!
//! One POST per batch, no retries. Anything other than `200 OK` is a failure and
//! is logged together with the outbound request for post-mortem debugging.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::event::Event;
use crate::tls::create_reqwest_client_builder;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use tracing::{debug, error};

const JSON_CONTENT_TYPE: &str = "application/json";
const MAX_PREVIEW_CHARS: usize = 1024;

#[async_trait]
pub trait Deliver {
    /// Sends one batch. Returns only once the endpoint accepted it or the attempt failed.
    async fn deliver(&self, batch: &[Event]) -> Result<(), RelayError>;
}

/// Encodes a batch as the JSON array the endpoint expects.
pub fn encode_batch(batch: &[Event]) -> Result<Vec<u8>, RelayError> {
    serde_json::to_vec(batch).map_err(RelayError::SerializationFailure)
}

#[derive(Debug, Clone)]
pub struct HttpDeliveryClient {
    client: Client,
    endpoint: Url,
}

impl HttpDeliveryClient {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = create_reqwest_client_builder(&config.trust())?
            .timeout(config.timeout)
            .build()
            .map_err(|err| RelayError::HttpClient(err.to_string()))?;
        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn log_failed_request(
        &self,
        body_len: usize,
        preview: &str,
        status: Option<StatusCode>,
        response_body: &str,
    ) {
        error!(
            method = %Method::POST,
            url = %self.endpoint,
            content_type = JSON_CONTENT_TYPE,
            body_len = body_len,
            body = %preview,
            status = ?status,
            response_body = %response_body,
            "Broken request to endpoint"
        );
    }
}

#[async_trait]
impl Deliver for HttpDeliveryClient {
    async fn deliver(&self, batch: &[Event]) -> Result<(), RelayError> {
        let body = encode_batch(batch)?;
        let body_len = body.len();
        let preview = body_preview(&body);

        debug!(
            url = %self.endpoint,
            body_len = body_len,
            "Posting {} events",
            batch.len()
        );

        let response = match self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.log_failed_request(body_len, &preview, None, "");
                return Err(RelayError::DeliveryFailure(format!("transport error: {err}")));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let response_body = response.text().await.unwrap_or_default();
            self.log_failed_request(body_len, &preview, Some(status), &response_body);
            return Err(RelayError::DeliveryFailure(format!(
                "unexpected status {status} from {}",
                self.endpoint
            )));
        }

        debug!("Endpoint accepted {} events", batch.len());
        Ok(())
    }
}

/// Truncated, lossy text view of a request body for diagnostics.
fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut chars = text.chars();
    let mut preview: String = chars.by_ref().take(MAX_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        preview.push('…');
    }
    preview
}
