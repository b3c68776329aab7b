// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Relays CloudTrail audit records stored in S3 to a log-analysis endpoint.
//!
//! A relay run reads each referenced object, unnests its `Records` array, turns
//! every record into an [`event::Event`] and POSTs the events in fixed-size
//! batches. Any failure aborts the run.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod batch;
pub mod config;
pub mod delivery;
pub mod error;
pub mod event;
pub mod extract;
pub mod relay;
pub mod storage;
pub mod tls;
pub mod unnest;

pub use config::RelayConfig;
pub use delivery::{Deliver, HttpDeliveryClient};
pub use error::RelayError;
pub use event::{Event, Metadata};
pub use relay::{Relay, RelaySummary};
pub use storage::{ObjectRef, ObjectStore, S3ObjectStore};
