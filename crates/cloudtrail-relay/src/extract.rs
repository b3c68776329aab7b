// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tolerant field extraction from raw CloudTrail records.
//!
//! A record is kept as an untyped [`serde_json::Value`]. Each field is read by
//! resolving a dot-separated path; anything that does not resolve becomes an
//! empty string. Extraction never fails.

use serde_json::Value;

pub const EVENT_TIME_PATH: &str = "eventTime";
pub const USER_NAME_PATH: &str = "userIdentity.userName";
pub const EVENT_SOURCE_PATH: &str = "eventSource";
pub const EVENT_NAME_PATH: &str = "eventName";
pub const REQUEST_PARAMETERS_PATH: &str = "requestParameters";
pub const ERROR_CODE_PATH: &str = "errorCode";
pub const ERROR_MESSAGE_PATH: &str = "errorMessage";
pub const EVENT_VERSION_PATH: &str = "eventVersion";
pub const AWS_REGION_PATH: &str = "awsRegion";
pub const SOURCE_IP_ADDRESS_PATH: &str = "sourceIPAddress";
pub const USER_AGENT_PATH: &str = "userAgent";

/// Flat string view of the fields read from one audit record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub event_time: String,
    pub user_name: String,
    pub event_source: String,
    pub event_name: String,
    /// Compact JSON of the record's `requestParameters`, passed through opaquely.
    pub request_parameters: String,
    pub error_code: String,
    pub error_message: String,
    pub event_version: String,
    pub aws_region: String,
    pub source_ip_address: String,
    pub user_agent: String,
}

impl ExtractedFields {
    pub fn from_record(record: &Value) -> Self {
        let field = |path| lookup_string(record, path).unwrap_or_default();
        Self {
            event_time: field(EVENT_TIME_PATH),
            user_name: field(USER_NAME_PATH),
            event_source: field(EVENT_SOURCE_PATH),
            event_name: field(EVENT_NAME_PATH),
            request_parameters: field(REQUEST_PARAMETERS_PATH),
            error_code: field(ERROR_CODE_PATH),
            error_message: field(ERROR_MESSAGE_PATH),
            event_version: field(EVENT_VERSION_PATH),
            aws_region: field(AWS_REGION_PATH),
            source_ip_address: field(SOURCE_IP_ADDRESS_PATH),
            user_agent: field(USER_AGENT_PATH),
        }
    }
}

/// Resolves a dot-separated path of object keys.
///
/// Returns `None` as soon as a segment is missing or the current value is not an object.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Resolves `path` and renders the value as a string.
///
/// Strings are returned as-is, numbers and booleans as their JSON text, objects and
/// arrays as compact JSON. `null` renders like a missing value.
pub fn lookup_string(value: &Value, path: &str) -> Option<String> {
    match lookup(value, path)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => serde_json::to_string(nested).ok(),
    }
}
