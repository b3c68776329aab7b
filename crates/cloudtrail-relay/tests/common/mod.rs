// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use cloudtrail_relay::{ObjectRef, ObjectStore, RelayError};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Object store backed by a map, standing in for S3.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: HashMap<ObjectRef, Vec<u8>>,
}

impl MemoryObjectStore {
    pub fn insert(&mut self, object: &ObjectRef, body: impl Into<Vec<u8>>) {
        self.objects.insert(object.clone(), body.into());
    }

    pub fn insert_records(&mut self, object: &ObjectRef, records: Vec<Value>) {
        self.insert(object, json!({ "Records": records }).to_string());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, object: &ObjectRef) -> Result<Vec<u8>, RelayError> {
        self.objects
            .get(object)
            .cloned()
            .ok_or_else(|| RelayError::StorageReadFailure {
                bucket: object.bucket.clone(),
                key: object.key.clone(),
                reason: "The specified key does not exist.".to_string(),
            })
    }
}

pub fn cloudtrail_record(user: &str, event_name: &str) -> Value {
    json!({
        "eventVersion": "1.08",
        "userIdentity": {
            "type": "IAMUser",
            "principalId": "AIDAEXAMPLE",
            "arn": format!("arn:aws:iam::123456789012:user/{user}"),
            "accountId": "123456789012",
            "userName": user
        },
        "eventTime": "2021-01-01T00:00:00Z",
        "eventSource": "s3.amazonaws.com",
        "eventName": event_name,
        "awsRegion": "eu-west-1",
        "sourceIPAddress": "198.51.100.4",
        "userAgent": "aws-cli/2.1.0",
        "requestParameters": {"bucketName": "reports"},
        "responseElements": null,
        "eventID": "3f2c1a5e-0000-0000-0000-000000000000",
        "readOnly": true
    })
}
