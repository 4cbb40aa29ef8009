// Test doubles for the three seams of a Beacon:
// - StaticDocument (LoaderDocument) — fixed current script + id lookup table
// - StaticPage (PageEnvironment) — shared PageView, mutable between signals
// - RecordingTransport (Transport) — records dispatched URLs in order

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::endpoint::{LoaderDocument, LoaderElement};
use crate::event::{PageEnvironment, PageView};
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// StaticDocument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StaticDocument {
    current_script: Option<LoaderElement>,
    by_id: HashMap<String, LoaderElement>,
}

impl StaticDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_script(mut self, element: LoaderElement) -> Self {
        self.current_script = Some(element);
        self
    }

    pub fn with_element(mut self, id: &str, element: LoaderElement) -> Self {
        self.by_id.insert(id.to_string(), element);
        self
    }
}

impl LoaderDocument for StaticDocument {
    fn current_script(&self) -> Option<LoaderElement> {
        self.current_script.clone()
    }

    fn element_by_id(&self, id: &str) -> Option<LoaderElement> {
        self.by_id.get(id).cloned()
    }
}

// ---------------------------------------------------------------------------
// StaticPage
// ---------------------------------------------------------------------------

/// Clones share the same view, so a test can keep a handle and change the
/// page after handing it to a beacon.
#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    view: Arc<Mutex<PageView>>,
}

impl StaticPage {
    pub fn new(view: PageView) -> Self {
        Self {
            view: Arc::new(Mutex::new(view)),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut PageView)) {
        f(&mut self.view.lock().unwrap());
    }
}

impl PageEnvironment for StaticPage {
    fn page_view(&self) -> PageView {
        self.view.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// RecordingTransport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    urls: Arc<Mutex<Vec<String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn dispatch(&self, url: String) {
        self.urls.lock().unwrap().push(url);
    }
}
