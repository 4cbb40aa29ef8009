pub mod beacon;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod query;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use beacon::Beacon;
pub use config::BeaconConfig;
pub use endpoint::{
    Endpoint, EndpointResolver, ExplicitEndpoint, LoaderDiscovery, LoaderDocument, LoaderElement,
    LOADER_ID,
};
pub use error::{BeaconError, Result};
pub use event::{Event, Field, FieldValue, PageEnvironment, PageView, ViewportSources};
pub use query::{decode_query, encode_query};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::Transport;
