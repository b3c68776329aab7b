// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::extract::ExtractedFields;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Record fields carried verbatim into the outbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub event_version: String,
    pub aws_region: String,
    pub event_source: String,
    #[serde(rename = "sourceIPAddress")]
    pub source_ip_address: String,
    pub user_agent: String,
}

impl From<&ExtractedFields> for Metadata {
    fn from(fields: &ExtractedFields) -> Self {
        Self {
            event_version: fields.event_version.clone(),
            aws_region: fields.aws_region.clone(),
            event_source: fields.event_source.clone(),
            source_ip_address: fields.source_ip_address.clone(),
            user_agent: fields.user_agent.clone(),
        }
    }
}

/// One normalized audit record, as sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Actor identity (`userIdentity.userName`)
    pub source: String,
    /// Event time as found in the record
    pub timestamp: String,
    pub message: String,
    pub metadata: Metadata,
}

impl Event {
    /// Builds an event, or drops the record when the actor or the event time is empty.
    ///
    /// A drop is reported with a warning and is never an error.
    pub fn from_fields(fields: ExtractedFields) -> Option<Self> {
        let message = synthesize_message(&fields);
        let metadata = Metadata::from(&fields);

        if fields.user_name.is_empty() || fields.event_time.is_empty() {
            warn!(
                source = %fields.user_name,
                timestamp = %fields.event_time,
                event_message = %message,
                "Dropping event with empty source or timestamp"
            );
            return None;
        }

        Some(Self {
            source: fields.user_name,
            timestamp: fields.event_time,
            message,
            metadata,
        })
    }
}

/// Builds `"<source> <name>"`, then appends the error and the request parameters when present.
pub fn synthesize_message(fields: &ExtractedFields) -> String {
    let mut message = format!("{} {}", fields.event_source, fields.event_name);
    if !fields.error_code.is_empty() {
        message.push_str(&format!(
            " errorCode:{} errorMessage:{}",
            fields.error_code, fields.error_message
        ));
    }
    if !fields.request_parameters.is_empty() {
        message.push_str(&format!(" requestParameters:{}", fields.request_parameters));
    }
    message.trim().to_string()
}
