//! The pageview event and the page state it is collected from.

use std::fmt;

/// Fields the collector understands, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Location,
    Referrer,
    ScreenWidth,
    ScreenHeight,
    ViewportWidth,
    ViewportHeight,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Location,
        Field::Referrer,
        Field::ScreenWidth,
        Field::ScreenHeight,
        Field::ViewportWidth,
        Field::ViewportHeight,
    ];

    /// Query parameter name.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Location => "l",
            Field::Referrer => "r",
            Field::ScreenWidth => "i",
            Field::ScreenHeight => "j",
            Field::ViewportWidth => "w",
            Field::ViewportHeight => "h",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

/// A single event: defined fields only, kept in insertion order.
///
/// Unknown values are never stored, so an encoded event carries no
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    fields: Vec<(Field, FieldValue)>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position if already present.
    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) -> &mut Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Builder form of [`Event::set`].
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set the field only when a value is known.
    pub fn set_opt<V: Into<FieldValue>>(&mut self, field: Field, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(field, value);
        }
        self
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldValue> {
        let index = self.fields.iter().position(|(f, _)| *f == field)?;
        Some(self.fields.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply `other` on top of this event.
    pub fn overlay(&mut self, other: &Event) -> &mut Self {
        for (field, value) in other.iter() {
            self.set(field, value.clone());
        }
        self
    }

    /// Build the pageview event from a snapshot of the page.
    pub fn collect(page: &PageView) -> Self {
        let mut event = Event::new();
        event
            .set_opt(Field::Location, non_empty(page.location.as_deref()))
            .set_opt(Field::Referrer, non_empty(page.referrer.as_deref()))
            .set_opt(Field::ScreenWidth, page.screen_width)
            .set_opt(Field::ScreenHeight, page.screen_height)
            .set_opt(Field::ViewportWidth, page.viewport_width.resolve())
            .set_opt(Field::ViewportHeight, page.viewport_height.resolve());
        event
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Viewport size candidates for one axis, in fallback order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSources {
    /// `window.innerWidth` / `innerHeight`.
    pub window_inner: Option<u32>,
    /// `document.documentElement.clientWidth` / `clientHeight`.
    pub document_element_client: Option<u32>,
    /// `document.body.clientWidth` / `clientHeight`.
    pub body_client: Option<u32>,
}

impl ViewportSources {
    pub fn window(size: u32) -> Self {
        Self {
            window_inner: Some(size),
            ..Self::default()
        }
    }

    /// First non-zero candidate. A zero reading means the source did not
    /// report a size, so the next one is tried.
    pub fn resolve(&self) -> Option<u32> {
        [self.window_inner, self.document_element_client, self.body_client]
            .into_iter()
            .flatten()
            .find(|size| *size > 0)
    }
}

/// What the page looks like right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub location: Option<String>,
    pub referrer: Option<String>,
    /// Available screen width.
    pub screen_width: Option<u32>,
    /// Available screen height.
    pub screen_height: Option<u32>,
    pub viewport_width: ViewportSources,
    pub viewport_height: ViewportSources,
}

/// Source of [`PageView`] snapshots. Read on every signal.
pub trait PageEnvironment {
    fn page_view(&self) -> PageView;
}
