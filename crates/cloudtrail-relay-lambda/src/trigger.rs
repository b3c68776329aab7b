// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_lambda_events::event::s3::S3Event;
use cloudtrail_relay::{ObjectRef, RelayError};

/// Lists the objects named by an S3 notification, in notification order.
///
/// A record lacking a bucket name or an object key names an object that cannot be
/// read, so it fails the whole invocation like any other unreadable object.
pub fn object_refs(event: &S3Event) -> Result<Vec<ObjectRef>, RelayError> {
    event
        .records
        .iter()
        .map(|record| match (&record.s3.bucket.name, &record.s3.object.key) {
            (Some(bucket), Some(key)) => Ok(ObjectRef::new(bucket.as_str(), key.as_str())),
            (bucket, key) => Err(RelayError::StorageReadFailure {
                bucket: bucket.clone().unwrap_or_default(),
                key: key.clone().unwrap_or_default(),
                reason: "notification record has no bucket name or object key".to_string(),
            }),
        })
        .collect()
}
