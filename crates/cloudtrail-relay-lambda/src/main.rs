// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod trigger;

use aws_lambda_events::event::s3::S3Event;
use cloudtrail_relay::{
    config::log_level_from_env, HttpDeliveryClient, Relay, RelayConfig, S3ObjectStore,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> Result<(), Error> {
    init_logging()?;

    let store = S3ObjectStore::from_env().await;
    run(service_fn(|event| handle_notification(event, &store))).await
}

fn init_logging() -> Result<(), Error> {
    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level_from_env());

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(env_filter)?)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    debug!("Logging subsystem enabled");
    Ok(())
}

async fn handle_notification(
    event: LambdaEvent<S3Event>,
    store: &S3ObjectStore,
) -> Result<(), Error> {
    let config = RelayConfig::from_env().inspect_err(|e| error!("{e}"))?;
    info!("Endpoint: {}", config.endpoint);
    info!("Batch size: {}", config.batch_size);

    let client = HttpDeliveryClient::new(&config).inspect_err(|e| error!("{e}"))?;
    let objects = trigger::object_refs(&event.payload).inspect_err(|e| error!("{e}"))?;

    match Relay::new(&config, store, &client).run(&objects).await {
        Ok(summary) => {
            info!(
                objects = summary.objects,
                records = summary.records,
                dropped = summary.dropped,
                batches = summary.batches,
                "Relayed {} events",
                summary.events
            );
            Ok(())
        }
        Err(e) => {
            error!("Relay failed: {e}");
            Err(e.into())
        }
    }
}
