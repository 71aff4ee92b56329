use crate::app::App;
use pendulum_core::FrameClock;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Frame clock backed by `requestAnimationFrame`.
///
/// The callback lives in a shared slot that is filled once the app exists
/// (the callback needs the app, the app owns the clock).
#[derive(Default)]
pub struct RafClock {
    callback: FrameSlot,
    handle: Option<i32>,
}

impl RafClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> FrameSlot {
        Rc::clone(&self.callback)
    }
}

impl FrameClock for RafClock {
    fn request_frame(&mut self) {
        let Some(window) = web::window() else {
            return;
        };
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            log::warn!("[loop] frame requested before the callback was installed");
            return;
        };
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.handle = Some(id),
            Err(e) => log::error!("[loop] requestAnimationFrame error: {:?}", e),
        }
    }

    fn cancel_frame(&mut self) {
        if let (Some(id), Some(window)) = (self.handle.take(), web::window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

/// Fill the clock's slot with a callback that renders one frame of `app`.
pub fn install_frame_callback(app: &Rc<RefCell<App>>) {
    let slot = app.borrow().frame_slot();
    let weak: Weak<RefCell<App>> = Rc::downgrade(app);
    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(app) = weak.upgrade() {
            app.borrow_mut().on_frame();
        }
    }) as Box<dyn FnMut()>));
}
