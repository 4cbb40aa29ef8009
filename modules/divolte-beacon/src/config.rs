use std::env;
use std::time::Duration;

use tracing::info;

use crate::endpoint::{Endpoint, ExplicitEndpoint};
use crate::error::{BeaconError, Result};

pub const ENDPOINT_VAR: &str = "DIVOLTE_ENDPOINT";
pub const SCRIPT_URL_VAR: &str = "DIVOLTE_SCRIPT_URL";
pub const TIMEOUT_VAR: &str = "DIVOLTE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the configured endpoint came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSource {
    Explicit,
    /// Derived from the collector's script URL, the same way a browser
    /// embedding derives it from the loader element.
    ScriptUrl(String),
}

/// Beacon configuration for non-browser embeddings, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    pub endpoint: Endpoint,
    pub source: EndpointSource,
    pub timeout: Duration,
}

impl BeaconConfig {
    /// Exactly one of `DIVOLTE_ENDPOINT` or `DIVOLTE_SCRIPT_URL` is required.
    /// `DIVOLTE_TIMEOUT_SECS` defaults to 10.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let explicit = lookup(ENDPOINT_VAR).filter(|v| !v.trim().is_empty());
        let script_url = lookup(SCRIPT_URL_VAR).filter(|v| !v.trim().is_empty());

        let (endpoint, source) = match (explicit, script_url) {
            (Some(base), None) => (Endpoint::parse(base.trim())?, EndpointSource::Explicit),
            (None, Some(src)) => {
                let src = src.trim().to_string();
                (Endpoint::from_script_src(&src)?, EndpointSource::ScriptUrl(src))
            }
            (Some(_), Some(_)) => {
                return Err(BeaconError::Config(format!(
                    "set only one of {ENDPOINT_VAR} or {SCRIPT_URL_VAR}"
                )))
            }
            (None, None) => {
                return Err(BeaconError::Config(format!(
                    "{ENDPOINT_VAR} or {SCRIPT_URL_VAR} environment variable is required"
                )))
            }
        };

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| BeaconError::Config(format!("{TIMEOUT_VAR} must be a number")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            endpoint,
            source,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn resolver(&self) -> ExplicitEndpoint {
        ExplicitEndpoint::new(self.endpoint.clone())
    }

    /// Record the effective configuration.
    pub fn log(&self) {
        match &self.source {
            EndpointSource::Explicit => info!(
                endpoint = %self.endpoint,
                timeout_secs = self.timeout.as_secs(),
                "Beacon configured with explicit endpoint"
            ),
            EndpointSource::ScriptUrl(src) => info!(
                endpoint = %self.endpoint,
                script_url = src.as_str(),
                timeout_secs = self.timeout.as_secs(),
                "Beacon endpoint derived from script URL"
            ),
        }
    }
}
