// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::RelayError;
use reqwest::{Certificate, ClientBuilder};
use std::path::PathBuf;
use tracing::{info, warn};

/// How the endpoint's TLS certificate is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointTrust {
    /// Skip certificate verification. The Unomaly appliance ships with a self-signed
    /// certificate, so this is the default when no certificate is pinned.
    AcceptInvalidCerts,
    /// Trust exactly the PEM certificate at this path, with verification enabled.
    PinnedCertificate(PathBuf),
}

/// Creates a reqwest client builder using rustls with the given trust mode applied.
pub fn create_reqwest_client_builder(trust: &EndpointTrust) -> Result<ClientBuilder, RelayError> {
    let builder = reqwest::Client::builder().use_rustls_tls();
    match trust {
        EndpointTrust::AcceptInvalidCerts => {
            warn!("TLS certificate verification toward the endpoint is disabled");
            Ok(builder.danger_accept_invalid_certs(true))
        }
        EndpointTrust::PinnedCertificate(path) => {
            let pem = std::fs::read(path).map_err(|err| {
                RelayError::HttpClient(format!(
                    "failed to read pinned certificate {}: {err}",
                    path.display()
                ))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|err| {
                RelayError::HttpClient(format!(
                    "failed to parse pinned certificate {}: {err}",
                    path.display()
                ))
            })?;
            info!("Pinning endpoint certificate from {}", path.display());
            Ok(builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(certificate))
        }
    }
}
