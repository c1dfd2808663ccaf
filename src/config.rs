//! Tunable constants for the demo.
//!
//! Defaults reproduce the look of the original page. In the browser they can
//! be overridden from the query string, e.g. `?seed=7&detail=3`.

use std::ops::Range;

use crate::error::{DemoError, Result};
use crate::mesh::IcoSphere;

/// Demo configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    /// Radius every vertex rests at.
    pub base_radius: f32,
    /// Icosahedron subdivision level.
    pub detail: u32,
    /// Upper bound on concurrently animating vertices.
    pub max_spikes: usize,
    /// Chance per frame of starting another spike while under the cap.
    pub spawn_probability: f32,
    /// Range the peak length of a new spike is drawn from.
    pub spike_peak: Range<f32>,
    /// Range the per-frame speed of a new spike is drawn from.
    pub spike_speed: Range<f32>,
    /// Range hue velocities are drawn from, in hue units per frame.
    pub hue_velocity: Range<f32>,
    pub saturation: f32,
    pub face_lightness: f32,
    pub corner_lightness: f32,
    pub vertex_lightness: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub camera_distance: f32,
    /// Fixed RNG seed; `None` seeds from the host.
    pub seed: Option<u64>,
    /// Log at `debug` instead of `info`.
    pub debug: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            base_radius: 10.0,
            detail: 2,
            max_spikes: 12,
            spawn_probability: 0.1,
            spike_peak: 12.0..20.0,
            spike_speed: 0.03..0.13,
            hue_velocity: 0.001..0.003,
            saturation: 0.7,
            face_lightness: 0.4,
            corner_lightness: 0.5,
            vertex_lightness: 0.4,
            fov_degrees: 50.0,
            camera_distance: 40.0,
            seed: None,
            debug: false,
        }
    }
}

/// Highest accepted subdivision level (980 faces).
pub const MAX_DETAIL: u32 = 6;

impl DemoConfig {
    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: impl Into<String>) -> Result<()> {
            Err(DemoError::InvalidConfig(msg.into()))
        }

        if !(self.base_radius > 0.0) {
            return invalid("base_radius must be positive");
        }
        if self.detail > MAX_DETAIL {
            return invalid(format!("detail must be at most {MAX_DETAIL}"));
        }
        let vertex_count = IcoSphere::vertex_count_for(self.detail);
        if self.max_spikes > vertex_count {
            return invalid(format!(
                "max_spikes must be at most {vertex_count} at detail {}",
                self.detail
            ));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return invalid("spawn_probability must be within [0, 1]");
        }
        if self.spike_peak.start <= self.base_radius || self.spike_peak.is_empty() {
            return invalid("spike_peak must be a non-empty range above base_radius");
        }
        if self.spike_speed.start <= 0.0 || self.spike_speed.is_empty() {
            return invalid("spike_speed must be a non-empty positive range");
        }
        if self.hue_velocity.start < 0.0 || self.hue_velocity.end >= 1.0 || self.hue_velocity.is_empty() {
            return invalid("hue_velocity must be a non-empty range within [0, 1)");
        }
        for (name, value) in [
            ("saturation", self.saturation),
            ("face_lightness", self.face_lightness),
            ("corner_lightness", self.corner_lightness),
            ("vertex_lightness", self.vertex_lightness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must be within [0, 1]"));
            }
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return invalid("fov_degrees must be within (0, 180)");
        }
        if self.camera_distance <= self.spike_peak.end {
            return invalid("camera_distance must clear the tallest spike");
        }
        Ok(())
    }

    /// Applies one `key=value` override.
    ///
    /// Returns `Ok(false)` for keys this config does not know about so the
    /// caller can decide whether that matters.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "seed" => self.seed = Some(parse(key, value)?),
            "detail" => self.detail = parse(key, value)?,
            "max_spikes" => self.max_spikes = parse(key, value)?,
            "spawn_probability" => self.spawn_probability = parse(key, value)?,
            "base_radius" => self.base_radius = parse(key, value)?,
            "fov" => self.fov_degrees = parse(key, value)?,
            "debug" => self.debug = parse_flag(value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Applies a sequence of overrides and validates the result.
    pub fn with_overrides<'a>(
        mut self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        for (key, value) in pairs {
            if !self.apply_override(key, value)? {
                log::warn!("ignoring unknown config key {key:?}");
            }
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DemoError::InvalidConfig(format!("{key}={value:?} is not a valid value")))
}

/// A present flag is on unless it says otherwise, so `?debug`, `?debug=1`
/// and `?debug=yes` all count.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
