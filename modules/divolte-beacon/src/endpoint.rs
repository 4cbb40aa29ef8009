//! Origin resolution: where events for this page view are sent.
//!
//! The collector serves the beacon script from the same directory that
//! exposes its `event` path, so the endpoint is the directory of the
//! loader script. Embedders that know the collector address up front
//! inject it with [`ExplicitEndpoint`]; browser embeddings discover it
//! with [`LoaderDiscovery`].

use std::fmt;

use tracing::debug;
use url::Url;

use crate::error::{BeaconError, Result};

/// Marker id the embedding page puts on the loader `<script>` element.
pub const LOADER_ID: &str = "divolte";

/// Path segment of the collector's ingestion endpoint, relative to [`Endpoint`].
pub const EVENT_PATH: &str = "event";

/// Base URL of the collector. Always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    /// Derive the endpoint from the fully resolved `src` of the loader script:
    /// everything up to and including the final path separator.
    ///
    /// Query and fragment are dropped first so a `/` inside them cannot
    /// move the cut point.
    pub fn from_script_src(src: &str) -> Result<Self> {
        let mut url = hierarchical_url(src)?;
        url.set_query(None);
        url.set_fragment(None);

        let resolved = url.as_str();
        let cut = resolved
            .rfind('/')
            .ok_or_else(|| BeaconError::invalid_source(src, "no path separator"))?;
        Ok(Self(resolved[..=cut].to_string()))
    }

    /// Endpoint from explicit configuration. The value names a directory,
    /// so a missing trailing separator is added.
    pub fn parse(base: &str) -> Result<Self> {
        let mut url = hierarchical_url(base)?;
        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{endpoint}event?{query}`. An empty query still carries the `?`.
    pub fn event_url(&self, query: &str) -> String {
        format!("{}{}?{}", self.0, EVENT_PATH, query)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn hierarchical_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(BeaconError::invalid_source(raw, "empty URL"));
    }
    let url = Url::parse(raw).map_err(|err| BeaconError::invalid_source(raw, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(BeaconError::invalid_source(raw, "not a hierarchical URL"));
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Resolution strategies
// ---------------------------------------------------------------------------

/// Produces the endpoint once, at client construction.
pub trait EndpointResolver {
    fn resolve(&self) -> Result<Endpoint>;
}

/// Endpoint supplied by configuration.
#[derive(Debug, Clone)]
pub struct ExplicitEndpoint(Endpoint);

impl ExplicitEndpoint {
    pub fn new(endpoint: Endpoint) -> Self {
        Self(endpoint)
    }
}

impl EndpointResolver for ExplicitEndpoint {
    fn resolve(&self) -> Result<Endpoint> {
        Ok(self.0.clone())
    }
}

/// The element that loaded the beacon, as seen by [`LoaderDiscovery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderElement {
    pub tag_name: String,
    pub id: Option<String>,
    /// Fully resolved source URL, if the element has one.
    pub src: Option<String>,
}

impl LoaderElement {
    pub fn script(id: Option<&str>, src: Option<&str>) -> Self {
        Self {
            tag_name: "script".to_string(),
            id: id.map(String::from),
            src: src.map(String::from),
        }
    }

    pub fn is_script(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("script")
    }
}

/// Read-only view of the hosting document.
pub trait LoaderDocument {
    /// The script element currently executing, when the host exposes it.
    fn current_script(&self) -> Option<LoaderElement>;

    fn element_by_id(&self, id: &str) -> Option<LoaderElement>;
}

/// Finds the loader script in the document by the [`LOADER_ID`] marker.
pub struct LoaderDiscovery<D> {
    document: D,
}

impl<D: LoaderDocument> LoaderDiscovery<D> {
    pub fn new(document: D) -> Self {
        Self { document }
    }

    /// Locate and validate the loader element.
    pub fn loader(&self) -> Result<LoaderElement> {
        let element = match self.document.current_script() {
            Some(element) => {
                debug!(tag = %element.tag_name, "Using currently executing script");
                element
            }
            None => {
                let element = self
                    .document
                    .element_by_id(LOADER_ID)
                    .ok_or(BeaconError::LoaderMissing)?;
                if !element.is_script() {
                    return Err(BeaconError::LoaderNotScript {
                        tag: element.tag_name.to_ascii_lowercase(),
                    });
                }
                debug!("Using script element found by id");
                element
            }
        };

        if element.id.as_deref() != Some(LOADER_ID) {
            return Err(BeaconError::LoaderIdMismatch { found: element.id });
        }
        Ok(element)
    }
}

impl<D: LoaderDocument> EndpointResolver for LoaderDiscovery<D> {
    fn resolve(&self) -> Result<Endpoint> {
        let element = self.loader()?;
        let src = element
            .src
            .as_deref()
            .filter(|src| !src.is_empty())
            .ok_or_else(|| BeaconError::invalid_source("", "loader script has no src"))?;
        Endpoint::from_script_src(src)
    }
}
