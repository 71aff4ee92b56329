#![cfg(target_arch = "wasm32")]
mod app;
mod audio;
mod canvas;
mod controls;
mod dom;
mod frame;

use app::App;
use audio::WebAudio;
use canvas::Canvas2dSurface;
use frame::RafClock;
use pendulum_core::{Config, RenderStyle, Simulation};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("pendulum-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    dom::fit_canvas_to_window(&window, &canvas);

    let style = RenderStyle::default();
    let config = Config {
        geometry: style.geometry_for(canvas.width() as f64, canvas.height() as f64),
        ..Config::default()
    };
    let surface = Canvas2dSurface::new(canvas)?;
    // The context stays suspended until the first click on the play button.
    let audio = WebAudio::new()?;
    let sim = Simulation::new(config, audio, RafClock::new(), style)?;

    let status = document.get_element_by_id("status");
    let app = Rc::new(RefCell::new(App::new(sim, surface, status)));
    frame::install_frame_callback(&app);
    app.borrow_mut().redraw();

    controls::build_inputs(&document, &app)?;
    controls::wire_buttons(&document, &app);
    controls::wire_window(&window, &app);
    log::info!("[init] ready; press play or space to start");
    Ok(())
}
