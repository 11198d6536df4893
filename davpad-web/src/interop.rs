use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{window, BeforeUnloadEvent, Blob, BlobPropertyBag, HtmlAnchorElement, HtmlElement, Url};

/// Blocking browser alert
pub fn alert(message: &str) {
    if let Some(window) = window() {
        let _ = window.alert_with_message(message);
    }
}

/// Move keyboard focus to the element with `id`, if it is mounted.
pub fn focus_element(id: &str) {
    let element = window()
        .and_then(|w| w.document())
        .and_then(|doc| doc.get_element_by_id(id));
    if let Some(element) = element {
        let _ = element.dyn_ref::<HtmlElement>().map(|e| e.focus());
    }
}

/// Keeps a `beforeunload` prompt installed until dropped.
pub struct UnloadGuard {
    listener: Closure<dyn FnMut(BeforeUnloadEvent)>,
}

impl UnloadGuard {
    pub fn install(message: &'static str) -> Option<Self> {
        let window = window()?;
        let listener = Closure::wrap(Box::new(move |event: BeforeUnloadEvent| {
            event.prevent_default();
            event.set_return_value(message);
        }) as Box<dyn FnMut(BeforeUnloadEvent)>);

        window
            .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { listener })
    }
}

impl Drop for UnloadGuard {
    fn drop(&mut self) {
        if let Some(window) = window() {
            let _ = window.remove_event_listener_with_callback(
                "beforeunload",
                self.listener.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Offer `bytes` to the user as a file download named `filename`.
pub fn download_blob(filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("no global `window` exists"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document on window"))?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type("application/octet-stream");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| JsValue::from_str("anchor element has unexpected type"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    Url::revoke_object_url(&url)
}
