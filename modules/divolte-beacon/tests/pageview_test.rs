//! Pageview scenarios through the public API, with recorded dispatches.

use divolte_beacon::testing::{RecordingTransport, StaticDocument, StaticPage};
use divolte_beacon::{
    decode_query, encode_query, Beacon, BeaconError, Event, Field, LoaderDiscovery, LoaderElement,
    PageView, ViewportSources,
};

fn loader(src: &str) -> LoaderDiscovery<StaticDocument> {
    LoaderDiscovery::new(
        StaticDocument::new().with_element("divolte", LoaderElement::script(Some("divolte"), Some(src))),
    )
}

fn pages() -> Vec<PageView> {
    vec![
        PageView::default(),
        PageView {
            location: Some("https://site.test/".to_string()),
            ..PageView::default()
        },
        PageView {
            location: Some("https://site.test/a?b=c&d=e".to_string()),
            referrer: Some("https://other.test/".to_string()),
            screen_width: Some(1440),
            screen_height: Some(900),
            viewport_width: ViewportSources {
                window_inner: None,
                document_element_client: Some(1425),
                body_client: None,
            },
            viewport_height: ViewportSources {
                window_inner: Some(0),
                document_element_client: Some(0),
                body_client: Some(780),
            },
        },
        PageView {
            location: Some("https://site.test/ünïcode path".to_string()),
            referrer: Some(String::new()),
            screen_width: None,
            screen_height: Some(768),
            viewport_width: ViewportSources::default(),
            viewport_height: ViewportSources::window(700),
        },
    ]
}

#[test]
fn encoded_keys_match_defined_fields() {
    for page in pages() {
        let event = Event::collect(&page);
        let decoded = decode_query(&encode_query(&event));

        let mut encoded_keys: Vec<_> = decoded.iter().map(|(key, _)| key.clone()).collect();
        let mut defined_keys: Vec<_> = event.iter().map(|(f, _)| f.key().to_string()).collect();
        encoded_keys.sort();
        defined_keys.sort();
        assert_eq!(encoded_keys, defined_keys, "page: {page:?}");

        for (key, value) in decoded {
            let field = Field::from_key(&key).unwrap();
            assert_eq!(event.get(field).unwrap().to_string(), value);
        }
    }
}

#[test]
fn fallback_viewport_values_are_sent() {
    let transport = RecordingTransport::new();
    Beacon::init(
        &loader("https://example.com/static/dvt.js"),
        StaticPage::new(pages().remove(2)),
        transport.clone(),
    )
    .unwrap();

    let url = transport.urls().remove(0);
    let (base, query) = url.split_once('?').unwrap();
    assert_eq!(base, "https://example.com/static/event");

    let pairs = decode_query(query);
    assert!(pairs.contains(&("w".to_string(), "1425".to_string())));
    assert!(pairs.contains(&("h".to_string(), "780".to_string())));
    assert!(pairs.contains(&("l".to_string(), "https://site.test/a?b=c&d=e".to_string())));
}

#[test]
fn two_signals_are_independent() {
    let transport = RecordingTransport::new();
    let page = StaticPage::new(pages().remove(1));
    let beacon = Beacon::init(&loader("https://example.com/static/dvt.js"), page.clone(), transport.clone()).unwrap();

    beacon.signal();
    page.update(|view| view.location = Some("https://site.test/two".to_string()));
    beacon.signal();

    assert_eq!(
        transport.urls(),
        vec![
            "https://example.com/static/event?l=https%3A%2F%2Fsite.test%2F",
            "https://example.com/static/event?l=https%3A%2F%2Fsite.test%2F",
            "https://example.com/static/event?l=https%3A%2F%2Fsite.test%2Ftwo",
        ]
    );
}

#[test]
fn misconfigured_loader_fails_before_any_dispatch() {
    let cases = vec![
        StaticDocument::new(),
        StaticDocument::new().with_element(
            "divolte",
            LoaderElement {
                tag_name: "IMG".to_string(),
                id: Some("divolte".to_string()),
                src: Some("https://example.com/static/dvt.js".to_string()),
            },
        ),
        StaticDocument::new().with_current_script(LoaderElement::script(
            Some("tracker"),
            Some("https://example.com/static/dvt.js"),
        )),
        StaticDocument::new().with_element("divolte", LoaderElement::script(Some("divolte"), Some("dvt.js"))),
    ];

    for document in cases {
        let transport = RecordingTransport::new();
        let result = Beacon::init(
            &LoaderDiscovery::new(document),
            StaticPage::new(pages().remove(1)),
            transport.clone(),
        );
        assert!(matches!(
            result,
            Err(BeaconError::LoaderMissing
                | BeaconError::LoaderNotScript { .. }
                | BeaconError::LoaderIdMismatch { .. }
                | BeaconError::InvalidSource { .. })
        ));
        assert!(transport.urls().is_empty());
    }
}
