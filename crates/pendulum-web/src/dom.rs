use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!(format!("{:?}", e))
}

/// Attach `handler` for `event` on `target` for the lifetime of the page.
pub fn add_listener(
    target: &web::EventTarget,
    event: &str,
    mut handler: impl FnMut(web::Event) + 'static,
) {
    let closure = Closure::wrap(Box::new(move |ev: web::Event| handler(ev)) as Box<dyn FnMut(web::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::error!("[dom] {} listener error: {:?}", event, e);
    }
    closure.forget();
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    match document.get_element_by_id(element_id) {
        Some(el) => add_listener(&el, "click", move |_| handler()),
        None => log::warn!("[dom] missing #{}", element_id),
    }
}

/// Match the canvas backing store to the window's inner size.
pub fn fit_canvas_to_window(window: &web::Window, canvas: &web::HtmlCanvasElement) {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32
    };
    let width = dim(window.inner_width());
    let height = dim(window.inner_height());
    canvas.set_width(width.max(1));
    canvas.set_height(height.max(1));
}

/// Whether a key event originated in a form control, which keeps its own keys.
pub fn from_form_control(ev: &web::Event) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "SELECT"))
        .unwrap_or(false)
}
