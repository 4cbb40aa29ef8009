//! Query-string encoding of events.

use crate::event::Event;

/// `key=value` pairs joined by `&`, values percent-encoded, in event order.
pub fn encode_query(event: &Event) -> String {
    event
        .iter()
        .map(|(field, value)| {
            format!("{}={}", field.key(), urlencoding::encode(&value.to_string()))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Split a query string back into decoded pairs. Pairs whose value is not
/// valid UTF-8 after decoding are kept verbatim.
pub fn decode_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Field, PageView, ViewportSources};

    #[test]
    fn encodes_defined_fields_only() {
        let page = PageView {
            location: Some("https://site.test/page".to_string()),
            referrer: None,
            screen_width: Some(1920),
            screen_height: Some(1080),
            viewport_width: ViewportSources::window(1200),
            viewport_height: ViewportSources::window(800),
        };

        assert_eq!(
            encode_query(&Event::collect(&page)),
            "l=https%3A%2F%2Fsite.test%2Fpage&i=1920&j=1080&w=1200&h=800"
        );
    }

    #[test]
    fn empty_event_encodes_to_empty_string() {
        assert_eq!(encode_query(&Event::new()), "");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let event = Event::new().with(Field::Location, "https://site.test/a b?x=1&y=ü#top");
        let query = encode_query(&event);

        assert!(!query.contains(' '));
        assert_eq!(query.matches('&').count(), 0);
        assert_eq!(query.matches('=').count(), 1);
        assert!(query.contains("%C3%BC"));
    }

    #[test]
    fn decode_round_trips_collected_event() {
        let page = PageView {
            location: Some("https://site.test/search?q=rust & wasm".to_string()),
            referrer: Some("https://ref.test/#frag".to_string()),
            screen_width: Some(2560),
            screen_height: None,
            viewport_width: ViewportSources::window(1280),
            viewport_height: ViewportSources::default(),
        };
        let event = Event::collect(&page);

        let decoded = decode_query(&encode_query(&event));
        let expected: Vec<_> = event
            .iter()
            .map(|(field, value)| (field.key().to_string(), value.to_string()))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn decode_tolerates_bare_keys_and_leading_question_mark() {
        assert_eq!(
            decode_query("?l=x&&r"),
            vec![
                ("l".to_string(), "x".to_string()),
                ("r".to_string(), String::new())
            ]
        );
        assert!(decode_query("").is_empty());
    }
}
