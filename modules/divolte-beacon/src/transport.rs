//! One-way delivery of event URLs.
//!
//! A transport hands the URL off and returns. Delivery is best effort:
//! the response is never read and failures are not reported or retried.

use std::sync::Arc;

pub trait Transport: Send + Sync {
    /// Start a GET for `url` without waiting for it.
    fn dispatch(&self, url: String);
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn dispatch(&self, url: String) {
        (**self).dispatch(url)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn dispatch(&self, url: String) {
        (**self).dispatch(url)
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::runtime::Handle;
    use tokio::sync::Notify;
    use tracing::debug;

    use super::Transport;
    use crate::error::{BeaconError, Result};

    #[derive(Default)]
    struct InFlight {
        count: AtomicUsize,
        idle: Notify,
    }

    /// Fires each event as a detached tokio task.
    #[derive(Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
        runtime: Handle,
        in_flight: Arc<InFlight>,
    }

    impl HttpTransport {
        /// Transport bound to the current tokio runtime.
        pub fn new(timeout: Duration) -> Result<Self> {
            let runtime =
                Handle::try_current().map_err(|err| BeaconError::Transport(err.to_string()))?;
            Self::with_runtime(timeout, runtime)
        }

        pub fn with_runtime(timeout: Duration, runtime: Handle) -> Result<Self> {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(Self {
                client,
                runtime,
                in_flight: Arc::new(InFlight::default()),
            })
        }

        /// Requests started but not yet finished.
        pub fn in_flight(&self) -> usize {
            self.in_flight.count.load(Ordering::SeqCst)
        }

        /// Wait up to `timeout` for outstanding requests to finish, e.g. before
        /// a short-lived process exits. Returns `false` if some were still
        /// running. Outcomes are not inspected.
        pub async fn settle(&self, timeout: Duration) -> bool {
            let idle = async {
                loop {
                    let notified = self.in_flight.idle.notified();
                    if self.in_flight() == 0 {
                        return;
                    }
                    notified.await;
                }
            };
            tokio::time::timeout(timeout, idle).await.is_ok()
        }
    }

    impl Transport for HttpTransport {
        fn dispatch(&self, url: String) {
            let client = self.client.clone();
            let in_flight = self.in_flight.clone();
            in_flight.count.fetch_add(1, Ordering::SeqCst);

            self.runtime.spawn(async move {
                match client.get(&url).send().await {
                    Ok(resp) => debug!(%url, status = resp.status().as_u16(), "Event sent"),
                    Err(err) => debug!(%url, error = %err, "Event dropped"),
                }
                if in_flight.count.fetch_sub(1, Ordering::SeqCst) == 1 {
                    in_flight.idle.notify_waiters();
                }
            });
        }
    }
}
