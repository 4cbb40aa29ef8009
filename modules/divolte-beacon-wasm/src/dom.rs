// DOM-backed implementations of the beacon seams.

use divolte_beacon::{LoaderDocument, LoaderElement, PageEnvironment, PageView, Transport, ViewportSources};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlImageElement, HtmlScriptElement, Window};

/// Loader lookup against the live document.
pub struct DomDocument {
    document: Document,
}

impl DomDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl LoaderDocument for DomDocument {
    fn current_script(&self) -> Option<LoaderElement> {
        self.document
            .current_script()
            .map(|script| loader_element(&script))
    }

    fn element_by_id(&self, id: &str) -> Option<LoaderElement> {
        self.document
            .get_element_by_id(id)
            .map(|element| loader_element(&element))
    }
}

fn loader_element(element: &Element) -> LoaderElement {
    let id = element.id();
    LoaderElement {
        tag_name: element.tag_name(),
        id: (!id.is_empty()).then_some(id),
        // `src` on a script element is already resolved against the document base.
        src: element
            .dyn_ref::<HtmlScriptElement>()
            .map(HtmlScriptElement::src)
            .filter(|src| !src.is_empty()),
    }
}

/// Page state read from the window and document on every call.
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }
}

impl PageEnvironment for DomPage {
    fn page_view(&self) -> PageView {
        let screen = self.window.screen().ok();
        let root = self.document.document_element();
        let body = self.body();

        PageView {
            location: self.window.location().href().ok(),
            referrer: Some(self.document.referrer()),
            screen_width: screen.as_ref().and_then(|s| s.avail_width().ok()).and_then(px),
            screen_height: screen.as_ref().and_then(|s| s.avail_height().ok()).and_then(px),
            viewport_width: ViewportSources {
                window_inner: js_px(self.window.inner_width()),
                document_element_client: root.as_ref().and_then(|e| px(e.client_width())),
                body_client: body.as_ref().and_then(|e| px(e.client_width())),
            },
            viewport_height: ViewportSources {
                window_inner: js_px(self.window.inner_height()),
                document_element_client: root.as_ref().and_then(|e| px(e.client_height())),
                body_client: body.as_ref().and_then(|e| px(e.client_height())),
            },
        }
    }
}

fn px(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}

fn js_px(value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>) -> Option<u32> {
    value
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u32)
}

/// Sends events by loading them as a detached 1x1 image. Works cross-origin
/// without CORS and never blocks the page; the image is not inserted into
/// the document and its load outcome is not observed.
pub struct ImageTransport;

impl Transport for ImageTransport {
    fn dispatch(&self, url: String) {
        if let Ok(image) = HtmlImageElement::new_with_width_and_height(1, 1) {
            image.set_src(&url);
        }
    }
}
