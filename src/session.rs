//! Everything the page mutates, gathered in one place.
//!
//! The browser shell owns a single [`AnimationSession`] and forwards UI events
//! and animation frames to it. The session reports what changed through
//! [`Dirty`] so the renderer only re-uploads what it must.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::color_state::{ColorMode, ColorState};
use crate::config::DemoConfig;
use crate::mesh::IcoSphere;
use crate::spike::SpikeAnimator;

/// Buffers that need re-uploading before the next draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dirty {
    pub colors: bool,
    pub positions: bool,
}

impl Dirty {
    pub const ALL: Dirty = Dirty {
        colors: true,
        positions: true,
    };

    pub fn any(self) -> bool {
        self.colors || self.positions
    }
}

/// State of the color animation checkbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorToggle {
    pub checked: bool,
    pub enabled: bool,
}

/// Mesh, colors, spikes and toggles of one page load.
#[derive(Clone, Debug)]
pub struct AnimationSession {
    mesh: IcoSphere,
    colors: ColorState,
    spikes: SpikeAnimator,
    rng: SmallRng,
    seed: u64,
    color_animation: bool,
    /// Color animation state to restore when leaving [`ColorMode::NoColor`].
    saved_color_animation: bool,
    vertex_animation: bool,
    wireframe_visible: bool,
    frame: u64,
    dirty: Dirty,
}

impl AnimationSession {
    /// Builds the mesh and random color state. Both animations start off and
    /// the wireframe starts visible.
    ///
    /// Seeds from `config.seed`, or from `fallback_seed` when that is unset.
    pub fn new(config: &DemoConfig, fallback_seed: u64) -> Self {
        let seed = config.seed.unwrap_or(fallback_seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mesh = IcoSphere::new(config.base_radius, config.detail);
        let colors = ColorState::random(&mesh, config, &mut rng);
        log::debug!(
            "session: {} vertices, {} faces, seed {seed}",
            mesh.vertex_count(),
            mesh.face_count(),
        );

        Self {
            spikes: SpikeAnimator::new(config),
            mesh,
            colors,
            rng,
            seed,
            color_animation: false,
            saved_color_animation: true,
            vertex_animation: false,
            wireframe_visible: true,
            frame: 0,
            dirty: Dirty::ALL,
        }
    }

    pub fn mesh(&self) -> &IcoSphere {
        &self.mesh
    }

    pub fn colors(&self) -> &ColorState {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut ColorState {
        &mut self.colors
    }

    pub fn spikes(&self) -> &SpikeAnimator {
        &self.spikes
    }

    /// Seed the session's randomness was drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn mode(&self) -> ColorMode {
        self.colors.mode()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn wireframe_visible(&self) -> bool {
        self.wireframe_visible
    }

    pub fn color_animation(&self) -> bool {
        self.color_animation
    }

    pub fn vertex_animation(&self) -> bool {
        self.vertex_animation
    }

    /// How the color animation checkbox should look.
    pub fn color_toggle(&self) -> ColorToggle {
        ColorToggle {
            checked: self.color_animation,
            enabled: self.mode() != ColorMode::NoColor,
        }
    }

    /// Whether the frame loop should keep running.
    pub fn is_animating(&self) -> bool {
        self.color_animation || self.vertex_animation
    }

    /// Ignored while the mode is [`ColorMode::NoColor`], where the checkbox is
    /// disabled.
    pub fn set_color_animation(&mut self, on: bool) {
        if self.mode() == ColorMode::NoColor {
            return;
        }
        self.color_animation = on;
    }

    pub fn set_vertex_animation(&mut self, on: bool) {
        self.vertex_animation = on;
    }

    pub fn set_wireframe_visible(&mut self, visible: bool) {
        self.wireframe_visible = visible;
    }

    /// Switches the color representation driving the material.
    ///
    /// Entering [`ColorMode::NoColor`] remembers and suspends color animation;
    /// leaving it restores the remembered state.
    pub fn select_mode(&mut self, mode: ColorMode) {
        let previous = self.colors.select(mode);
        if previous == mode {
            return;
        }
        if previous == ColorMode::NoColor {
            self.color_animation = self.saved_color_animation;
        }
        if mode == ColorMode::NoColor {
            self.saved_color_animation = self.color_animation;
            self.color_animation = false;
        }
        log::info!("color mode {previous} -> {mode}");
        self.dirty.colors = true;
    }

    /// Snaps every spiked vertex back and forgets all spikes.
    pub fn reset_vertices(&mut self) {
        if !self.spikes.is_empty() {
            self.dirty.positions = true;
        }
        self.spikes.reset(&mut self.mesh);
        log::info!("vertices reset");
    }

    /// Runs one animation frame.
    pub fn tick(&mut self) {
        self.frame += 1;
        if self.color_animation && self.colors.advance() {
            self.dirty.colors = true;
        }
        if self.vertex_animation {
            self.spikes.step(&mut self.mesh, &mut self.rng);
            self.dirty.positions = true;
        }
    }

    /// Returns and clears the pending dirty flags.
    pub fn take_dirty(&mut self) -> Dirty {
        std::mem::take(&mut self.dirty)
    }
}
