//! TLS trust policy for the default transport.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use ureq::tls::{Certificate, PemItem, RootCerts, TlsConfig};

use crate::error::ClientError;
use crate::logger::Logger;

pub(crate) const NO_CERTS_APPENDED: &str = "No certs appended, using system certs only";

/// Which server certificates the default transport accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Accept any certificate. Development and tests only.
    Insecure,
    /// Platform roots plus the PEM certificates in `extra_roots`, if given.
    Verify { extra_roots: Option<PathBuf> },
}

impl TrustPolicy {
    pub fn new(insecure: bool, cert_file: Option<&Path>) -> Self {
        if insecure {
            TrustPolicy::Insecure
        } else {
            TrustPolicy::Verify {
                extra_roots: cert_file.map(Path::to_path_buf),
            }
        }
    }

    /// Assemble the ureq TLS configuration. Reading `extra_roots` is the only
    /// fallible step; a file without certificates just logs a warning.
    pub(crate) fn tls_config(&self, logger: &dyn Logger) -> Result<TlsConfig, ClientError> {
        let extra_roots = match self {
            TrustPolicy::Insecure => {
                return Ok(TlsConfig::builder().disable_verification(true).build());
            }
            TrustPolicy::Verify { extra_roots } => extra_roots,
        };

        let mut roots = system_roots();
        if let Some(path) = extra_roots {
            let pem = std::fs::read(path).map_err(|source| ClientError::CertificateFile {
                path: path.clone(),
                source,
            })?;
            let appended = parse_certificates(&pem);
            if appended.is_empty() {
                warn!(path = %path.display(), "{}", NO_CERTS_APPENDED);
                logger.record(NO_CERTS_APPENDED);
            } else {
                debug!(path = %path.display(), count = appended.len(), "appended custom roots");
                roots.extend(appended);
            }
        }

        Ok(TlsConfig::builder()
            .root_certs(RootCerts::Specific(Arc::new(roots)))
            .build())
    }
}

/// Certificates from the platform store. Missing or unreadable stores yield
/// an empty list.
fn system_roots() -> Vec<Certificate<'static>> {
    let loaded = rustls_native_certs::load_native_certs();
    if !loaded.errors.is_empty() {
        debug!(errors = loaded.errors.len(), "some platform roots could not be loaded");
    }
    loaded
        .certs
        .iter()
        .map(|der| Certificate::from_der(der.as_ref()).to_owned())
        .collect()
}

/// Every `CERTIFICATE` block in a PEM bundle. Keys and malformed blocks are
/// skipped.
fn parse_certificates(pem: &[u8]) -> Vec<Certificate<'static>> {
    ureq::tls::parse_pem(pem)
        .filter_map(|item| match item {
            Ok(PemItem::Certificate(cert)) => Some(cert.to_owned()),
            _ => None,
        })
        .collect()
}
