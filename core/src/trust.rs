//! TLS trust selection.
//!
//! # Design
//! Trust material is resolved once, when a client is built, and never
//! changes afterwards. Anything that can go wrong (unreadable store, bad PEM)
//! therefore fails client construction instead of the first HTTPS call.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use ureq::tls::{Certificate, PemItem, RootCerts, TlsConfig};

use crate::error::RestError;

/// Which certificate authorities a client accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustMode {
    /// The operating system trust store.
    #[default]
    Platform,
    /// Accept any certificate chain. Only for development against
    /// self-signed endpoints.
    InsecureTrustAll,
}

#[derive(Clone)]
enum Anchors {
    /// Mozilla roots compiled into the TLS stack.
    Bundled,
    Certificates(Arc<Vec<Certificate<'static>>>),
    Unchecked,
}

/// Resolved trust material for outbound HTTPS connections.
#[derive(Clone)]
pub struct TrustPolicy {
    mode: TrustMode,
    anchors: Anchors,
}

impl TrustPolicy {
    /// Resolve the platform store, or the insecure trust-all mode when
    /// `trust_all` is set.
    pub fn resolve(trust_all: bool) -> Result<Self, RestError> {
        if trust_all {
            Ok(Self::insecure_trust_all())
        } else {
            Self::platform()
        }
    }

    /// Trust what the operating system trusts. Falls back to the bundled
    /// Mozilla roots when the OS store holds no certificates.
    pub fn platform() -> Result<Self, RestError> {
        let native = load_native_certificates();
        if native.is_empty() {
            warn!("operating system trust store is empty, using bundled root certificates");
            return Ok(Self {
                mode: TrustMode::Platform,
                anchors: Anchors::Bundled,
            });
        }
        debug!(certificates = native.len(), "loaded operating system trust store");
        Ok(Self {
            mode: TrustMode::Platform,
            anchors: Anchors::Certificates(Arc::new(native)),
        })
    }

    /// Operating system trust store plus every certificate in the PEM file at
    /// `path`.
    pub fn platform_with_ca_file(path: &Path) -> Result<Self, RestError> {
        let extra = read_pem_certificates(path)?;
        let mut certs = load_native_certificates();
        if certs.is_empty() {
            warn!(
                ca_file = %path.display(),
                "operating system trust store is empty, trusting only the configured CA file"
            );
        }
        certs.extend(extra);
        debug!(certificates = certs.len(), "resolved trust store with extra CA file");
        Ok(Self {
            mode: TrustMode::Platform,
            anchors: Anchors::Certificates(Arc::new(certs)),
        })
    }

    /// Disable certificate verification entirely.
    pub fn insecure_trust_all() -> Self {
        warn!("TLS certificate verification is disabled for this client");
        Self {
            mode: TrustMode::InsecureTrustAll,
            anchors: Anchors::Unchecked,
        }
    }

    pub fn mode(&self) -> TrustMode {
        self.mode
    }

    pub fn is_insecure(&self) -> bool {
        matches!(self.anchors, Anchors::Unchecked)
    }

    /// Number of explicit trust anchors, `None` for bundled roots or
    /// trust-all.
    pub fn anchor_count(&self) -> Option<usize> {
        match &self.anchors {
            Anchors::Certificates(certs) => Some(certs.len()),
            Anchors::Bundled | Anchors::Unchecked => None,
        }
    }

    pub(crate) fn tls_config(&self) -> TlsConfig {
        match &self.anchors {
            Anchors::Bundled => TlsConfig::builder().root_certs(RootCerts::WebPki).build(),
            Anchors::Certificates(certs) => TlsConfig::builder()
                .root_certs(RootCerts::Specific(Arc::clone(certs)))
                .build(),
            Anchors::Unchecked => TlsConfig::builder().disable_verification(true).build(),
        }
    }
}

impl fmt::Debug for TrustPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustPolicy")
            .field("mode", &self.mode)
            .field("anchors", &self.anchor_count())
            .finish()
    }
}

fn load_native_certificates() -> Vec<Certificate<'static>> {
    let result = rustls_native_certs::load_native_certs();
    for error in &result.errors {
        warn!(%error, "failed to load part of the operating system trust store");
    }
    result
        .certs
        .iter()
        .map(|der| Certificate::from_der(der.as_ref()).to_owned())
        .collect()
}

fn read_pem_certificates(path: &Path) -> Result<Vec<Certificate<'static>>, RestError> {
    let pem = std::fs::read(path).map_err(|e| {
        RestError::trust_with_cause(format!("cannot read CA file {}", path.display()), e)
    })?;
    let mut certs = Vec::new();
    for item in ureq::tls::parse_pem(&pem) {
        let item = item.map_err(|e| {
            RestError::trust_with_cause(format!("malformed PEM in {}", path.display()), e)
        })?;
        if let PemItem::Certificate(cert) = item {
            certs.push(cert.to_owned());
        }
    }
    if certs.is_empty() {
        return Err(RestError::trust(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}
