// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::batch::Batches;
use crate::config::RelayConfig;
use crate::delivery::Deliver;
use crate::error::RelayError;
use crate::event::Event;
use crate::extract::ExtractedFields;
use crate::storage::{ObjectRef, ObjectStore};
use crate::unnest::unnest_records;
use std::num::NonZeroUsize;
use tracing::{debug, info};

/// Counters for one successful relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub objects: usize,
    pub records: usize,
    pub dropped: usize,
    pub events: usize,
    pub batches: usize,
}

/// Drives one invocation: read every object, normalize every record, deliver in batches.
///
/// Everything happens in sequence. The first error aborts the run; batches already
/// delivered stay delivered and nothing after the failure is attempted.
pub struct Relay<'a, S: ?Sized, D: ?Sized> {
    batch_size: NonZeroUsize,
    store: &'a S,
    deliverer: &'a D,
}

impl<'a, S, D> Relay<'a, S, D>
where
    S: ObjectStore + Sync + ?Sized,
    D: Deliver + Sync + ?Sized,
{
    pub fn new(config: &RelayConfig, store: &'a S, deliverer: &'a D) -> Self {
        Self {
            batch_size: config.batch_size,
            store,
            deliverer,
        }
    }

    pub async fn run(&self, objects: &[ObjectRef]) -> Result<RelaySummary, RelayError> {
        let mut summary = RelaySummary::default();
        let mut events = Vec::new();

        for object in objects {
            debug!("Reading {object}");
            let body = self.store.get_object(object).await?;
            let records = unnest_records(&body)?;
            summary.objects += 1;
            summary.records += records.len();

            for record in &records {
                match Event::from_fields(ExtractedFields::from_record(record)) {
                    Some(event) => events.push(event),
                    None => summary.dropped += 1,
                }
            }
            debug!("Extracted {} records from {object}", records.len());
        }

        summary.events = events.len();
        info!("Number of events to send: {}", summary.events);

        let mut batches = Batches::new(events, self.batch_size);
        loop {
            let remaining = batches.remaining();
            let Some(batch) = batches.next() else {
                break;
            };
            debug!("Events left to process: {remaining}");
            self.deliverer.deliver(&batch).await?;
            summary.batches += 1;
            info!("Sent {} events to endpoint", batch.len());
        }

        Ok(summary)
    }
}
