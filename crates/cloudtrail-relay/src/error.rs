// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that abort a relay invocation.
///
/// Every variant is terminal: nothing is retried and no partially-relayed state is kept.
/// Records dropped for missing fields are not errors and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read object s3://{bucket}/{key}: {reason}")]
    StorageReadFailure {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Failed to serialize batch: {0}")]
    SerializationFailure(#[from] serde_json::Error),

    #[error("Failed to deliver batch: {0}")]
    DeliveryFailure(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
