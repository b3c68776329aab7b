// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::RelayError;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use std::fmt;
use tracing::debug;

/// Location of one storage object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    fn read_failure(&self, reason: impl fmt::Display) -> RelayError {
        RelayError::StorageReadFailure {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[async_trait]
pub trait ObjectStore {
    /// Returns the full content of the object.
    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>, RelayError>;
}

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Builds a client from the standard AWS environment (region, credentials).
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>, RelayError> {
        let output = self
            .client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|err| object.read_failure(DisplayErrorContext(&err)))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| object.read_failure(err))?
            .into_bytes();

        debug!("Read {} bytes from {object}", body.len());
        Ok(body.to_vec())
    }
}
