//! A sphere whose colors drift through hue space while single vertices spike
//! out and fall back, rendered with WebGL2 from WebAssembly.
//!
//! The animation model (mesh, color modes, spikes, session state) is plain
//! Rust and builds on any target. The browser shell lives in `wasm` and is
//! only compiled for `wasm32`.

pub mod camera;
pub mod color;
pub mod color_state;
pub mod config;
pub mod error;
pub mod mesh;
pub mod session;
pub mod spike;

pub use color_state::ColorMode;
pub use config::DemoConfig;
pub use error::{DemoError, Result};
pub use session::{AnimationSession, Dirty};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod frame_loop;
    mod render;
    mod ui;

    #[cfg(test)]
    mod tests;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Debug).ok();
        log::set_max_level(log::LevelFilter::Info);

        let config = match ui::config_from_query() {
            Ok(config) => config,
            Err(err) => {
                log::error!("bad query string: {err}");
                ui::show_fatal_error(&err);
                return Ok(());
            }
        };
        if config.debug {
            log::set_max_level(log::LevelFilter::Debug);
        }
        log::info!("spike sphere starting");

        // A failed start replaces the canvas with a message; there is nothing
        // left to run afterwards.
        if let Err(err) = ui::start(config) {
            log::error!("start-up failed: {err}");
            ui::show_fatal_error(&err);
        }
        Ok(())
    }
}
