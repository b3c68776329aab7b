// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::RelayError;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Envelope of a CloudTrail log object: `{"Records": [...]}`.
#[derive(Debug, Deserialize)]
struct CloudTrailEnvelope {
    #[serde(rename = "Records")]
    records: Vec<Value>,
}

/// Decodes one storage object and returns its audit records in order.
///
/// CloudTrail delivers `.json.gz` objects, so gzip bodies are inflated first.
/// Fails with [`RelayError::MalformedPayload`] when the body is not JSON, is not an
/// object, or lacks a `Records` array.
pub fn unnest_records(body: &[u8]) -> Result<Vec<Value>, RelayError> {
    let body = decompress_if_gzip(body)?;
    serde_json::from_slice::<CloudTrailEnvelope>(&body)
        .map(|envelope| envelope.records)
        .map_err(|err| RelayError::MalformedPayload(err.to_string()))
}

fn decompress_if_gzip(body: &[u8]) -> Result<Cow<'_, [u8]>, RelayError> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(body));
    }
    let mut decompressed = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decompressed)
        .map_err(|err| RelayError::MalformedPayload(format!("invalid gzip body: {err}")))?;
    Ok(Cow::Owned(decompressed))
}
