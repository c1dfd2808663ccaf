use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::camera::{Camera, Trackball};
use crate::error::{DemoError, Result};
use crate::session::{AnimationSession, Dirty};

const POSITION: u32 = 0;
const NORMAL: u32 = 1;
const COLOR: u32 = 2;

/// `0x222222` ambient plus one white directional light riding on the camera.
const AMBIENT: [f32; 3] = [0.133, 0.133, 0.133];
const LIGHT_DIR: [f32; 3] = [0.0, 0.0, 1.0];

const SOLID_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

uniform mat4 u_mvp;
uniform mat3 u_normal_matrix;
uniform vec3 u_light_dir;
uniform vec3 u_ambient;

out vec3 v_color;

void main() {
    vec3 n = normalize(u_normal_matrix * a_normal);
    float diffuse = max(dot(n, u_light_dir), 0.0);
    v_color = a_color * (u_ambient + vec3(diffuse));
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const SOLID_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
out vec4 out_color;

void main() {
    out_color = vec4(v_color, 1.0);
}
"#;

const WIRE_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
uniform mat4 u_mvp;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const WIRE_FS: &str = r#"#version 300 es
precision mediump float;
out vec4 out_color;

void main() {
    out_color = vec4(0.0, 0.0, 0.0, 1.0);
}
"#;

struct SolidProgram {
    program: WebGlProgram,
    mvp: Option<WebGlUniformLocation>,
    normal_matrix: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
}

struct WireProgram {
    program: WebGlProgram,
    mvp: Option<WebGlUniformLocation>,
}

/// Draws the shaded sphere and its wireframe overlay.
///
/// The solid mesh is an unindexed triangle list so every face corner can
/// carry its own color; the wireframe indexes the shared vertices.
pub struct Renderer {
    gl: GL,
    solid: SolidProgram,
    wire: WireProgram,
    solid_vao: WebGlVertexArrayObject,
    wire_vao: WebGlVertexArrayObject,
    corner_positions: WebGlBuffer,
    corner_colors: WebGlBuffer,
    vertex_positions: WebGlBuffer,
    corner_count: i32,
    edge_index_count: i32,
    scratch: Vec<f32>,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement, session: &AnimationSession) -> Result<Self> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or(DemoError::NoWebGl2)?
            .dyn_into()
            .map_err(|_| DemoError::NoWebGl2)?;

        let program = link(&gl, SOLID_VS, SOLID_FS)?;
        let solid = SolidProgram {
            mvp: gl.get_uniform_location(&program, "u_mvp"),
            normal_matrix: gl.get_uniform_location(&program, "u_normal_matrix"),
            light_dir: gl.get_uniform_location(&program, "u_light_dir"),
            ambient: gl.get_uniform_location(&program, "u_ambient"),
            program,
        };
        let program = link(&gl, WIRE_VS, WIRE_FS)?;
        let wire = WireProgram {
            mvp: gl.get_uniform_location(&program, "u_mvp"),
            program,
        };

        let mesh = session.mesh();
        let corner_positions = create_buffer(&gl, "corner position buffer")?;
        let corner_normals = create_buffer(&gl, "corner normal buffer")?;
        let corner_colors = create_buffer(&gl, "corner color buffer")?;
        let vertex_positions = create_buffer(&gl, "vertex position buffer")?;
        let edge_indices = create_buffer(&gl, "edge index buffer")?;

        let solid_vao = gl
            .create_vertex_array()
            .ok_or(DemoError::Allocation("solid vertex array"))?;
        gl.bind_vertex_array(Some(&solid_vao));
        bind_attribute(&gl, &corner_positions, POSITION);
        bind_attribute(&gl, &corner_normals, NORMAL);
        bind_attribute(&gl, &corner_colors, COLOR);

        let wire_vao = gl
            .create_vertex_array()
            .ok_or(DemoError::Allocation("wire vertex array"))?;
        gl.bind_vertex_array(Some(&wire_vao));
        bind_attribute(&gl, &vertex_positions, POSITION);
        let edges: Vec<u16> = mesh
            .edges()
            .into_iter()
            .flatten()
            .map(|i| i as u16)
            .collect();
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&edge_indices));
        gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &js_sys::Uint16Array::from(edges.as_slice()),
            GL::STATIC_DRAW,
        );
        gl.bind_vertex_array(None);

        // Normals never change: spiked vertices keep their rest normal.
        let mut scratch = Vec::new();
        mesh.write_corner_normals(&mut scratch);
        upload_f32(&gl, &corner_normals, &scratch, GL::STATIC_DRAW);

        gl.enable(GL::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);

        log::debug!("renderer ready: {} corners, {} edges", mesh.face_count() * 3, edges.len() / 2);

        Ok(Self {
            corner_count: (mesh.face_count() * 3) as i32,
            edge_index_count: edges.len() as i32,
            gl,
            solid,
            wire,
            solid_vao,
            wire_vao,
            corner_positions,
            corner_colors,
            vertex_positions,
            scratch,
        })
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Re-uploads the buffers flagged in `dirty`.
    pub fn upload(&mut self, session: &AnimationSession, dirty: Dirty) {
        let mesh = session.mesh();
        if dirty.positions {
            mesh.write_corner_positions(&mut self.scratch);
            upload_f32(&self.gl, &self.corner_positions, &self.scratch, GL::DYNAMIC_DRAW);
            mesh.write_vertex_positions(&mut self.scratch);
            upload_f32(&self.gl, &self.vertex_positions, &self.scratch, GL::DYNAMIC_DRAW);
        }
        if dirty.colors {
            session.colors().write_corner_colors(mesh, &mut self.scratch);
            upload_f32(&self.gl, &self.corner_colors, &self.scratch, GL::DYNAMIC_DRAW);
        }
    }

    pub fn draw(&self, camera: &Camera, trackball: &Trackball, wireframe: bool) {
        let gl = &self.gl;
        let mvp = camera.projection() * camera.view() * trackball.model();
        let mvp = mvp.to_cols_array();

        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        // Push the faces back a little so the wireframe wins the depth test.
        gl.enable(GL::POLYGON_OFFSET_FILL);
        gl.polygon_offset(1.0, 1.0);
        gl.use_program(Some(&self.solid.program));
        gl.uniform_matrix4fv_with_f32_array(self.solid.mvp.as_ref(), false, &mvp);
        gl.uniform_matrix3fv_with_f32_array(
            self.solid.normal_matrix.as_ref(),
            false,
            &trackball.normal_matrix().to_cols_array(),
        );
        gl.uniform3fv_with_f32_array(self.solid.light_dir.as_ref(), &LIGHT_DIR);
        gl.uniform3fv_with_f32_array(self.solid.ambient.as_ref(), &AMBIENT);
        gl.bind_vertex_array(Some(&self.solid_vao));
        gl.draw_arrays(GL::TRIANGLES, 0, self.corner_count);
        gl.disable(GL::POLYGON_OFFSET_FILL);

        if wireframe {
            gl.use_program(Some(&self.wire.program));
            gl.uniform_matrix4fv_with_f32_array(self.wire.mvp.as_ref(), false, &mvp);
            gl.bind_vertex_array(Some(&self.wire_vao));
            gl.draw_elements_with_i32(GL::LINES, self.edge_index_count, GL::UNSIGNED_SHORT, 0);
        }

        gl.bind_vertex_array(None);
    }
}

fn create_buffer(gl: &GL, what: &'static str) -> Result<WebGlBuffer> {
    gl.create_buffer().ok_or(DemoError::Allocation(what))
}

/// Points attribute `location` at three tightly packed floats in `buffer`.
/// Expects the target vertex array to be bound.
fn bind_attribute(gl: &GL, buffer: &WebGlBuffer, location: u32) {
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, 3, GL::FLOAT, false, 0, 0);
}

fn upload_f32(gl: &GL, buffer: &WebGlBuffer, data: &[f32], usage: u32) {
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &js_sys::Float32Array::from(data), usage);
}

fn compile(gl: &GL, stage: u32, source: &str) -> Result<WebGlShader> {
    let name = if stage == GL::VERTEX_SHADER { "vertex" } else { "fragment" };
    let shader = gl
        .create_shader(stage)
        .ok_or(DemoError::Allocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(DemoError::ShaderCompile { stage: name, log })
    }
}

fn link(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram> {
    let vs = compile(gl, GL::VERTEX_SHADER, vertex)?;
    let fs = compile(gl, GL::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or(DemoError::Allocation("shader program"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);

    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    // Shaders are owned by the program once linked.
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(DemoError::ProgramLink(log))
    }
}
