//! Client configuration.
//!
//! `ClientConfig` deserializes from any serde format, so an application can
//! embed it in its own configuration file. Every field has a default.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::RestError;
use crate::trust::{TrustMode, TrustPolicy};

const DEFAULT_MAX_REDIRECTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub trust: TrustMode,
    /// Extra PEM root certificates, only used with platform trust.
    pub ca_file: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            trust: TrustMode::Platform,
            ca_file: None,
            user_agent: Some(default_user_agent()),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    pub(crate) fn trust_policy(&self) -> Result<TrustPolicy, RestError> {
        match (self.trust, &self.ca_file) {
            (TrustMode::InsecureTrustAll, _) => Ok(TrustPolicy::insecure_trust_all()),
            (TrustMode::Platform, Some(path)) => TrustPolicy::platform_with_ca_file(path),
            (TrustMode::Platform, None) => TrustPolicy::platform(),
        }
    }
}

fn default_user_agent() -> String {
    format!("simple-rest/{}", env!("CARGO_PKG_VERSION"))
}
