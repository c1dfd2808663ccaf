use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::window;

use crate::error::{DemoError, Result};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` loop that can pause itself.
///
/// The step function runs once per display refresh and returns whether
/// another frame is wanted. Once it returns `false` the loop stops
/// rescheduling until [`FrameLoop::resume`] is called.
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
    callback: FrameCallback,
}

impl FrameLoop {
    pub fn new(mut step: impl FnMut() -> bool + 'static) -> Self {
        let running = Rc::new(Cell::new(false));

        // The closure has to reschedule itself, so it lives in a shared slot
        // it can reach from inside its own body.
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let slot = callback.clone();
        let flag = running.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !step() {
                flag.set(false);
                log::debug!("frame loop paused");
                return;
            }
            if let Err(err) = request_frame(&slot) {
                log::error!("could not schedule next frame: {err}");
                flag.set(false);
            }
        }) as Box<dyn FnMut()>));

        Self { running, callback }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Schedules the next frame unless one is already pending.
    pub fn resume(&self) -> Result<()> {
        if self.running.get() {
            return Ok(());
        }
        request_frame(&self.callback)?;
        self.running.set(true);
        log::debug!("frame loop started");
        Ok(())
    }
}

fn request_frame(callback: &FrameCallback) -> Result<()> {
    let window = window().ok_or_else(|| DemoError::MissingElement("window".into()))?;
    let callback = callback.borrow();
    let closure = callback
        .as_ref()
        .ok_or_else(|| DemoError::Js("frame callback dropped".into()))?;
    window.request_animation_frame(closure.as_ref().unchecked_ref())?;
    Ok(())
}
