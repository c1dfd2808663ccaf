//! Error type shared by the core and the browser shell.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while setting up or driving the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    /// A DOM element the page is expected to provide is missing or has the
    /// wrong type.
    #[error("element #{0} not found")]
    MissingElement(String),

    /// The canvas refused to hand out a WebGL2 context.
    #[error("WebGL2 not supported")]
    NoWebGl2,

    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("failed to link shader program: {0}")]
    ProgramLink(String),

    #[error("failed to allocate {0}")]
    Allocation(&'static str),

    /// A configuration value failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown color mode {0:?}")]
    UnknownColorMode(String),

    /// An exception thrown on the JavaScript side.
    #[error("{0}")]
    Js(String),
}

pub type Result<T, E = DemoError> = std::result::Result<T, E>;

impl From<JsValue> for DemoError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        DemoError::Js(message)
    }
}

impl From<DemoError> for JsValue {
    fn from(err: DemoError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
