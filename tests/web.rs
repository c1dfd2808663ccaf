#![cfg(target_arch = "wasm32")]

use spike_sphere::color_state::ColorMode;
use spike_sphere::{AnimationSession, DemoConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn webgl2_context_available() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    let context = canvas.get_context("webgl2").unwrap();
    assert!(context.is_some(), "browser under test has no WebGL2");
}

#[wasm_bindgen_test]
fn session_runs_in_browser() {
    let mut session = AnimationSession::new(&DemoConfig::default(), 17);
    session.set_vertex_animation(true);
    session.set_color_animation(true);
    session.select_mode(ColorMode::OnePerVertex);
    for _ in 0..240 {
        session.tick();
    }
    assert_eq!(session.frame(), 240);
    assert!(session.spikes().len() <= 12);

    let mut rgb = Vec::new();
    session.colors().write_corner_colors(session.mesh(), &mut rgb);
    assert_eq!(rgb.len(), session.mesh().face_count() * 9);
}
