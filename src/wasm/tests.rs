use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL};

use super::frame_loop::FrameLoop;
use super::render::Renderer;
use super::ui::show_fatal_error;
use crate::camera::{Camera, Trackball};
use crate::color_state::ColorMode;
use crate::error::DemoError;
use crate::{AnimationSession, DemoConfig, Dirty};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn canvas(size: u32) -> HtmlCanvasElement {
    let canvas: HtmlCanvasElement = document()
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_width(size);
    canvas.set_height(size);
    canvas
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn renderer_uploads_and_draws_every_mode() {
    let config = DemoConfig::default();
    let canvas = canvas(64);
    let mut session = AnimationSession::new(&config, 21);
    let mut renderer = Renderer::new(&canvas, &session).unwrap();
    renderer.set_viewport(64, 64);
    let camera = Camera::new(&config, 1.0);
    let trackball = Trackball::default();

    session.set_vertex_animation(true);
    session.set_color_animation(true);
    for mode in ColorMode::ALL {
        session.select_mode(mode);
        session.tick();
        let dirty = session.take_dirty();
        assert!(dirty.positions);
        renderer.upload(&session, dirty);
        renderer.draw(&camera, &trackball, true);
        renderer.draw(&camera, &trackball, false);
    }
    renderer.upload(&session, Dirty::ALL);
    renderer.draw(&camera, &trackball, false);

    let gl: GL = canvas.get_context("webgl2").unwrap().unwrap().dyn_into().unwrap();
    assert_eq!(gl.get_error(), GL::NO_ERROR);

    // The lit sphere covers the middle of the viewport; the background is black.
    let mut pixel = [0u8; 4];
    gl.read_pixels_with_opt_u8_array(32, 32, 1, 1, GL::RGBA, GL::UNSIGNED_BYTE, Some(&mut pixel))
        .unwrap();
    assert!(pixel[..3].iter().any(|&c| c > 0), "center pixel {pixel:?}");
}

#[wasm_bindgen_test]
fn fatal_error_replaces_canvas_holder() {
    let document = document();
    let holder = document.create_element("div").unwrap();
    holder.set_id("canvas-holder");
    holder.append_child(&canvas(16)).unwrap();
    document.body().unwrap().append_child(&holder).unwrap();

    show_fatal_error(&DemoError::NoWebGl2);

    let text = holder.text_content().unwrap_or_default();
    assert_eq!(text, "Sorry, an error occurred: WebGL2 not supported");
    assert!(holder.query_selector("canvas").unwrap().is_none());
    assert!(holder.query_selector("p > b").unwrap().is_some());
    holder.remove();
}

#[wasm_bindgen_test(async)]
async fn frame_loop_resumes_once_and_pauses_when_idle() {
    let steps = Rc::new(Cell::new(0u32));
    let frames = FrameLoop::new({
        let steps = steps.clone();
        move || {
            steps.set(steps.get() + 1);
            steps.get() < 3
        }
    });
    assert!(!frames.is_running());

    frames.resume().unwrap();
    frames.resume().unwrap();
    assert!(frames.is_running());

    for _ in 0..100 {
        if !frames.is_running() {
            break;
        }
        sleep(20).await;
    }
    assert!(!frames.is_running());
    // A second pending request would have kept a parallel chain going.
    sleep(100).await;
    assert_eq!(steps.get(), 3);

    frames.resume().unwrap();
    sleep(100).await;
    assert_eq!(steps.get(), 4);
    assert!(!frames.is_running());
}
