//! DOM wiring: finds the page's controls, owns the app state and routes
//! events into the session.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Event, EventTarget, HtmlButtonElement, HtmlCanvasElement, HtmlInputElement,
    HtmlSelectElement, MouseEvent, TouchEvent, UrlSearchParams,
};

use super::frame_loop::FrameLoop;
use super::render::Renderer;
use crate::camera::{Camera, Trackball};
use crate::color_state::ColorMode;
use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::session::{AnimationSession, ColorToggle};

/// Reads `DemoConfig` overrides from the page's query string.
pub fn config_from_query() -> Result<DemoConfig> {
    let window = window().ok_or_else(|| DemoError::MissingElement("window".into()))?;
    let search = window.location().search()?;
    let params = UrlSearchParams::new_with_str(&search)?;

    let mut pairs = Vec::new();
    if let Some(entries) = js_sys::try_iter(&params)? {
        for entry in entries {
            let entry: js_sys::Array = entry?.unchecked_into();
            let key = entry.get(0).as_string().unwrap_or_default();
            let value = entry.get(1).as_string().unwrap_or_default();
            pairs.push((key, value));
        }
    }
    DemoConfig::default().with_overrides(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Replaces the canvas with an error message.
pub fn show_fatal_error(err: &DemoError) {
    let message = format!("Sorry, an error occurred: {err}");
    let Some(document) = window().and_then(|w| w.document()) else {
        log::error!("{message}");
        return;
    };
    let Some(holder) = document.get_element_by_id("canvas-holder") else {
        log::error!("{message}");
        return;
    };

    let build = || -> std::result::Result<(), JsValue> {
        let p = document.create_element("p")?;
        let b = document.create_element("b")?;
        b.set_text_content(Some(&message));
        p.append_child(&b)?;
        holder.set_inner_html("");
        holder.append_child(&p)?;
        Ok(())
    };
    if build().is_err() {
        holder.set_text_content(Some(&message));
    }
}

/// Builds the scene, hooks up every control and draws the first frame.
pub fn start(config: DemoConfig) -> Result<()> {
    let window = window().ok_or_else(|| DemoError::MissingElement("window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DemoError::MissingElement("document".into()))?;

    let controls = Controls::find(&document)?;
    controls.reset_to_defaults();
    let canvas: HtmlCanvasElement = element(&document, "scene")?;

    let fallback_seed = (js_sys::Math::random() * 2f64.powi(53)) as u64;
    let session = AnimationSession::new(&config, fallback_seed);
    let seed = session.seed();
    let renderer = Renderer::new(&canvas, &session)?;
    let aspect = canvas.width() as f32 / canvas.height().max(1) as f32;

    let app = Rc::new(RefCell::new(App {
        session,
        renderer,
        camera: Camera::new(&config, aspect),
        trackball: Trackball::default(),
        canvas,
        controls,
        drag: None,
    }));
    app.borrow_mut().fit_canvas();

    let frames = Rc::new(FrameLoop::new({
        let app = app.clone();
        move || app.borrow_mut().animate_frame()
    }));

    install_control_handlers(&app, &frames)?;
    install_trackball_handlers(&document, &app, &frames)?;

    {
        let app = app.clone();
        listen(&window, "resize", move |_| {
            let mut app = app.borrow_mut();
            app.fit_canvas();
            app.redraw();
        })?;
    }

    app.borrow_mut().redraw();
    log::info!("spike sphere running (seed {seed})");
    Ok(())
}

struct Controls {
    color_type: HtmlSelectElement,
    color_animation: HtmlInputElement,
    vertex_animation: HtmlInputElement,
    show_wireframe: HtmlInputElement,
    reset: HtmlButtonElement,
}

impl Controls {
    fn find(document: &Document) -> Result<Self> {
        Ok(Self {
            color_type: element(document, "colorTypeSelect")?,
            color_animation: element(document, "colorAnimationCheckbox")?,
            vertex_animation: element(document, "vertexAnimationCheckbox")?,
            show_wireframe: element(document, "showWireframeCheckbox")?,
            reset: element(document, "resetVertices")?,
        })
    }

    /// Browsers restore form state on reload; force it to match a fresh
    /// session.
    fn reset_to_defaults(&self) {
        self.color_animation.set_checked(false);
        self.color_animation.set_disabled(false);
        self.vertex_animation.set_checked(false);
        self.show_wireframe.set_checked(true);
        self.color_type.set_value(ColorMode::default().as_str());
    }

    fn show_color_toggle(&self, toggle: ColorToggle) {
        self.color_animation.set_checked(toggle.checked);
        self.color_animation.set_disabled(!toggle.enabled);
    }
}

struct App {
    session: AnimationSession,
    renderer: Renderer,
    camera: Camera,
    trackball: Trackball,
    canvas: HtmlCanvasElement,
    controls: Controls,
    /// Last pointer position while dragging.
    drag: Option<Vec2>,
}

impl App {
    fn redraw(&mut self) {
        let dirty = self.session.take_dirty();
        if dirty.any() {
            self.renderer.upload(&self.session, dirty);
        }
        self.renderer
            .draw(&self.camera, &self.trackball, self.session.wireframe_visible());
    }

    /// One tick of the frame loop. Returns whether the loop should continue.
    fn animate_frame(&mut self) -> bool {
        let animating = self.session.is_animating();
        if animating {
            self.session.tick();
        }
        self.redraw();
        animating
    }

    /// Matches the drawing buffer to the canvas's displayed size.
    fn fit_canvas(&mut self) {
        let width = self.canvas.client_width();
        let height = self.canvas.client_height();
        if width > 0 && height > 0 {
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
        }
        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.camera.set_viewport(width, height);
        self.renderer.set_viewport(width, height);
    }

    fn drag_to(&mut self, position: Vec2) {
        if let Some(last) = self.drag.replace(position) {
            let height = self.canvas.client_height().max(1) as f32;
            self.trackball.drag(position - last, height);
        }
    }
}

/// Starts or stops the frame loop to match the toggles, and redraws directly
/// when no frame is coming.
fn refresh(app: &RefCell<App>, frames: &FrameLoop) {
    if app.borrow().session.is_animating() {
        if let Err(err) = frames.resume() {
            log::error!("could not start animation: {err}");
        }
    }
    if !frames.is_running() {
        app.borrow_mut().redraw();
    }
}

fn install_control_handlers(app: &Rc<RefCell<App>>, frames: &Rc<FrameLoop>) -> Result<()> {
    let guard = app.borrow();
    let controls = &guard.controls;

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(&controls.color_type, "change", move |_| {
            {
                let app = &mut *app.borrow_mut();
                match app.controls.color_type.value().parse::<ColorMode>() {
                    Ok(mode) => app.session.select_mode(mode),
                    Err(err) => log::warn!("{err}"),
                }
                app.controls.show_color_toggle(app.session.color_toggle());
                app.controls.reset.focus().ok();
            }
            refresh(&app, &frames);
        })?;
    }

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(&controls.color_animation, "change", move |_| {
            {
                let app = &mut *app.borrow_mut();
                app.session
                    .set_color_animation(app.controls.color_animation.checked());
            }
            refresh(&app, &frames);
        })?;
    }

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(&controls.vertex_animation, "change", move |_| {
            {
                let app = &mut *app.borrow_mut();
                app.session
                    .set_vertex_animation(app.controls.vertex_animation.checked());
            }
            refresh(&app, &frames);
        })?;
    }

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(&controls.show_wireframe, "change", move |_| {
            {
                let app = &mut *app.borrow_mut();
                app.session
                    .set_wireframe_visible(app.controls.show_wireframe.checked());
            }
            refresh(&app, &frames);
        })?;
    }

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(&controls.reset, "click", move |_| {
            app.borrow_mut().session.reset_vertices();
            refresh(&app, &frames);
        })?;
    }

    Ok(())
}

/// Drag with the mouse or one finger to spin the sphere.
fn install_trackball_handlers(
    document: &Document,
    app: &Rc<RefCell<App>>,
    frames: &Rc<FrameLoop>,
) -> Result<()> {
    let canvas = app.borrow().canvas.clone();

    {
        let app = app.clone();
        listen(&canvas, "mousedown", move |event| {
            if let Ok(event) = event.dyn_into::<MouseEvent>() {
                app.borrow_mut().drag = Some(mouse_position(&event));
            }
        })?;
    }

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(document, "mousemove", move |event| {
            let Ok(event) = event.dyn_into::<MouseEvent>() else {
                return;
            };
            {
                let mut app = app.borrow_mut();
                if app.drag.is_none() {
                    return;
                }
                app.drag_to(mouse_position(&event));
            }
            refresh(&app, &frames);
        })?;
    }

    {
        let app = app.clone();
        listen(document, "mouseup", move |_| {
            app.borrow_mut().drag = None;
        })?;
    }

    {
        let app = app.clone();
        listen(&canvas, "touchstart", move |event| {
            let Ok(event) = event.dyn_into::<TouchEvent>() else {
                return;
            };
            app.borrow_mut().drag = single_touch(&event);
        })?;
    }

    {
        let (app, frames) = (app.clone(), frames.clone());
        listen(&canvas, "touchmove", move |event| {
            let Ok(event) = event.dyn_into::<TouchEvent>() else {
                return;
            };
            let Some(position) = single_touch(&event) else {
                return;
            };
            event.prevent_default();
            app.borrow_mut().drag_to(position);
            refresh(&app, &frames);
        })?;
    }

    {
        let app = app.clone();
        listen(&canvas, "touchend", move |_| {
            app.borrow_mut().drag = None;
        })?;
    }

    Ok(())
}

fn mouse_position(event: &MouseEvent) -> Vec2 {
    Vec2::new(event.client_x() as f32, event.client_y() as f32)
}

fn single_touch(event: &TouchEvent) -> Option<Vec2> {
    let touches = event.touches();
    if touches.length() != 1 {
        return None;
    }
    let touch = touches.get(0)?;
    Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<T>().ok())
        .ok_or_else(|| DemoError::MissingElement(id.to_owned()))
}

/// Adds an event listener that lives as long as the page.
fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) -> Result<()> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
