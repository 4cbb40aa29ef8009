use tracing::{debug, info};

use crate::endpoint::{Endpoint, EndpointResolver};
use crate::error::Result;
use crate::event::{Event, PageEnvironment};
use crate::query::encode_query;
use crate::transport::Transport;

/// A ready beacon for one page view: the resolved endpoint plus the page
/// and transport it reports through.
pub struct Beacon<P, T> {
    endpoint: Endpoint,
    page: P,
    transport: T,
}

impl<P: PageEnvironment, T: Transport> Beacon<P, T> {
    /// Resolve the endpoint and fire the initial pageview.
    ///
    /// Resolution errors are returned before anything is sent.
    pub fn init<R: EndpointResolver + ?Sized>(resolver: &R, page: P, transport: T) -> Result<Self> {
        let endpoint = resolver.resolve()?;
        info!(endpoint = %endpoint, "Divolte base URL detected");

        let beacon = Self {
            endpoint,
            page,
            transport,
        };
        debug!("Firing initial event");
        beacon.signal();
        Ok(beacon)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a pageview describing the page as it is now.
    pub fn signal(&self) {
        let event = Event::collect(&self.page.page_view());
        self.send(&event);
    }

    /// Like [`Beacon::signal`], with `overlay` applied over the collected fields.
    pub fn signal_with(&self, overlay: &Event) {
        let mut event = Event::collect(&self.page.page_view());
        event.overlay(overlay);
        self.send(&event);
    }

    /// The URL an event is delivered to.
    pub fn event_url(&self, event: &Event) -> String {
        self.endpoint.event_url(&encode_query(event))
    }

    fn send(&self, event: &Event) {
        let url = self.event_url(event);
        debug!(fields = event.len(), "Signalling event");
        self.transport.dispatch(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{ExplicitEndpoint, LoaderDiscovery};
    use crate::error::BeaconError;
    use crate::event::{Field, PageView, ViewportSources};
    use crate::testing::{RecordingTransport, StaticDocument, StaticPage};

    fn scenario_page() -> PageView {
        PageView {
            location: Some("https://site.test/page".to_string()),
            referrer: None,
            screen_width: Some(1920),
            screen_height: Some(1080),
            viewport_width: ViewportSources::window(1200),
            viewport_height: ViewportSources::window(800),
        }
    }

    fn scenario_document() -> StaticDocument {
        StaticDocument::new().with_element(
            "divolte",
            crate::endpoint::LoaderElement::script(
                Some("divolte"),
                Some("https://example.com/static/dvt.js"),
            ),
        )
    }

    #[test]
    fn init_fires_exactly_one_pageview() {
        let transport = RecordingTransport::new();
        let beacon = Beacon::init(
            &LoaderDiscovery::new(scenario_document()),
            StaticPage::new(scenario_page()),
            transport.clone(),
        )
        .unwrap();

        assert_eq!(beacon.endpoint().as_str(), "https://example.com/static/");
        assert_eq!(
            transport.urls(),
            vec!["https://example.com/static/event?l=https%3A%2F%2Fsite.test%2Fpage&i=1920&j=1080&w=1200&h=800"]
        );
    }

    #[test]
    fn failed_resolution_sends_nothing() {
        let transport = RecordingTransport::new();
        let result = Beacon::init(
            &LoaderDiscovery::new(StaticDocument::new()),
            StaticPage::new(scenario_page()),
            transport.clone(),
        );

        assert!(matches!(result, Err(BeaconError::LoaderMissing)));
        assert!(transport.urls().is_empty());
    }

    #[test]
    fn signal_reads_page_at_call_time() {
        let transport = RecordingTransport::new();
        let page = StaticPage::new(scenario_page());
        let beacon = Beacon::init(
            &ExplicitEndpoint::new(Endpoint::parse("https://example.com/static/").unwrap()),
            page.clone(),
            transport.clone(),
        )
        .unwrap();

        page.update(|view| {
            view.location = Some("https://site.test/next".to_string());
            view.referrer = Some("https://site.test/page".to_string());
            view.viewport_width = ViewportSources::window(600);
        });
        beacon.signal();

        let urls = transport.urls();
        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[1],
            "https://example.com/static/event?l=https%3A%2F%2Fsite.test%2Fnext\
             &r=https%3A%2F%2Fsite.test%2Fpage&i=1920&j=1080&w=600&h=800"
        );
    }

    #[test]
    fn signal_with_keeps_collected_fields() {
        let transport = RecordingTransport::new();
        let beacon = Beacon::init(
            &ExplicitEndpoint::new(Endpoint::parse("https://example.com/").unwrap()),
            StaticPage::new(scenario_page()),
            transport.clone(),
        )
        .unwrap();

        beacon.signal_with(&Event::new().with(Field::Location, "https://site.test/virtual"));

        let last = transport.urls().pop().unwrap();
        assert_eq!(
            last,
            "https://example.com/event?l=https%3A%2F%2Fsite.test%2Fvirtual&i=1920&j=1080&w=1200&h=800"
        );
    }

    #[test]
    fn empty_page_sends_empty_query() {
        let transport = RecordingTransport::new();
        Beacon::init(
            &ExplicitEndpoint::new(Endpoint::parse("https://example.com/").unwrap()),
            StaticPage::new(PageView::default()),
            transport.clone(),
        )
        .unwrap();

        assert_eq!(transport.urls(), vec!["https://example.com/event?"]);
    }
}
