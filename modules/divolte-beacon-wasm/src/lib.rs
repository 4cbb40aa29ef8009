//! Browser build of the Divolte beacon.
//!
//! Loaded by the page through
//! `<script id="divolte" src="https://collector.example/dvt.js">`. On start
//! it finds that element, derives the collector endpoint from its `src`,
//! fires the initial pageview and exposes the client as `window.dvt`
//! (aliased `window.$$$`):
//!
//! ```javascript
//! // after an in-page navigation
//! dvt.signal();
//! ```

mod dom;

use divolte_beacon::{Beacon, BeaconError, LoaderDiscovery};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use web_sys::console;

pub use dom::{DomDocument, DomPage, ImageTransport};

/// Global names the client is published under.
const GLOBAL_NAMES: [&str; 2] = ["dvt", "$$$"];

/// The beacon client as seen from JavaScript.
#[wasm_bindgen]
pub struct Dvt {
    beacon: Beacon<DomPage, ImageTransport>,
}

#[wasm_bindgen]
impl Dvt {
    /// Fire a pageview event describing the page as it is now.
    pub fn signal(&self) {
        self.beacon.signal();
    }

    #[wasm_bindgen(getter, js_name = baseUrl)]
    pub fn base_url(&self) -> String {
        self.beacon.endpoint().to_string()
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console::log_1(&"Initializing DVT.".into());

    let window = web_sys::window().ok_or_else(|| js_error("DVT requires a window"))?;
    let document = window
        .document()
        .ok_or_else(|| js_error("DVT requires a document"))?;

    let resolver = LoaderDiscovery::new(DomDocument::new(document.clone()));
    let beacon = Beacon::init(&resolver, DomPage::new(window.clone(), document), ImageTransport)
        .map_err(into_js_error)?;
    console::info_2(
        &"Divolte base URL detected".into(),
        &beacon.endpoint().as_str().into(),
    );

    let dvt = JsValue::from(Dvt { beacon });
    for name in GLOBAL_NAMES {
        Reflect::set(&window, &name.into(), &dvt)?;
    }
    console::log_2(&"Module initialized".into(), &dvt);
    Ok(())
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn into_js_error(err: BeaconError) -> JsValue {
    js_error(&err.to_string())
}
