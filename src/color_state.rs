//! The three color granularities and the mode selecting between them.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::color::{DriftingColor, Hsl, WHITE};
use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::mesh::IcoSphere;

/// Which color storage currently drives shading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Plain white material.
    NoColor,
    /// One color per face.
    #[default]
    OnePerFace,
    /// One color per face corner.
    ThreePerFace,
    /// One color per shared vertex, interpolated across faces.
    OnePerVertex,
}

impl ColorMode {
    pub const ALL: [ColorMode; 4] = [
        ColorMode::NoColor,
        ColorMode::OnePerFace,
        ColorMode::ThreePerFace,
        ColorMode::OnePerVertex,
    ];

    /// Value of the matching `<option>` in the page's select box.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::NoColor => "NoColor",
            ColorMode::OnePerFace => "OnePerFace",
            ColorMode::ThreePerFace => "ThreePerFace",
            ColorMode::OnePerVertex => "OnePerVertex",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DemoError::UnknownColorMode(s.to_owned()))
    }
}

/// All three color representations of a mesh plus the active mode.
///
/// Only the active representation drifts; the others keep their values until
/// selected again.
#[derive(Clone, Debug)]
pub struct ColorState {
    mode: ColorMode,
    per_face: Vec<DriftingColor>,
    per_corner: Vec<[DriftingColor; 3]>,
    per_vertex: Vec<DriftingColor>,
}

impl ColorState {
    /// Random colors and velocities sized for `mesh`.
    pub fn random(mesh: &IcoSphere, config: &DemoConfig, rng: &mut impl Rng) -> Self {
        let mut drifting = |lightness: f32| DriftingColor {
            color: Hsl::new(rng.gen::<f32>(), config.saturation, lightness),
            velocity: rng.gen_range(config.hue_velocity.clone()),
        };

        let per_vertex = (0..mesh.vertex_count())
            .map(|_| drifting(config.vertex_lightness))
            .collect();
        let per_face = (0..mesh.face_count())
            .map(|_| drifting(config.face_lightness))
            .collect();
        let per_corner = (0..mesh.face_count())
            .map(|_| std::array::from_fn(|_| drifting(config.corner_lightness)))
            .collect();

        Self {
            mode: ColorMode::default(),
            per_face,
            per_corner,
            per_vertex,
        }
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Makes `mode` the one driving the material. Returns the previous mode.
    pub fn select(&mut self, mode: ColorMode) -> ColorMode {
        std::mem::replace(&mut self.mode, mode)
    }

    pub fn per_face(&self) -> &[DriftingColor] {
        &self.per_face
    }

    pub fn per_face_mut(&mut self) -> &mut [DriftingColor] {
        &mut self.per_face
    }

    pub fn per_corner(&self) -> &[[DriftingColor; 3]] {
        &self.per_corner
    }

    pub fn per_vertex(&self) -> &[DriftingColor] {
        &self.per_vertex
    }

    /// Drifts every hue of the active representation by one frame.
    ///
    /// Returns whether anything changed.
    pub fn advance(&mut self) -> bool {
        match self.mode {
            ColorMode::NoColor => return false,
            ColorMode::OnePerFace => self.per_face.iter_mut().for_each(DriftingColor::advance),
            ColorMode::ThreePerFace => self
                .per_corner
                .iter_mut()
                .flatten()
                .for_each(DriftingColor::advance),
            ColorMode::OnePerVertex => self.per_vertex.iter_mut().for_each(DriftingColor::advance),
        }
        true
    }

    /// RGB of every face corner under the active mode, as a flat triangle
    /// list matching [`IcoSphere::write_corner_positions`].
    pub fn write_corner_colors(&self, mesh: &IcoSphere, out: &mut Vec<f32>) {
        out.clear();
        for (f, face) in mesh.faces().iter().enumerate() {
            let corners: [[f32; 3]; 3] = match self.mode {
                ColorMode::NoColor => [WHITE; 3],
                ColorMode::OnePerFace => [self.per_face[f].color.to_rgb(); 3],
                ColorMode::ThreePerFace => self.per_corner[f].map(|c| c.color.to_rgb()),
                ColorMode::OnePerVertex => face.map(|v| self.per_vertex[v as usize].color.to_rgb()),
            };
            for rgb in corners {
                out.extend_from_slice(&rgb);
            }
        }
    }
}
