//! Vertices that shoot out from the sphere and fall back.

use std::collections::HashSet;
use std::ops::Range;

use rand::Rng;

use crate::config::DemoConfig;
use crate::mesh::IcoSphere;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Outbound,
    Returning,
}

/// One vertex in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Spike {
    pub vertex: usize,
    pub length: f32,
    pub phase: Phase,
    pub peak: f32,
    /// Length change per frame.
    pub speed: f32,
}

impl Spike {
    /// Moves one frame along the spike. Returns `false` once the vertex is
    /// back at `base` and the spike is finished.
    fn step(&mut self, base: f32) -> bool {
        match self.phase {
            Phase::Outbound => {
                self.length = (self.length + self.speed).min(self.peak);
                if self.length >= self.peak {
                    self.phase = Phase::Returning;
                }
                true
            }
            Phase::Returning => {
                self.length -= self.speed;
                if self.length <= base {
                    self.length = base;
                    false
                } else {
                    true
                }
            }
        }
    }
}

/// Spawns, advances and retires spikes.
#[derive(Clone, Debug)]
pub struct SpikeAnimator {
    spikes: Vec<Spike>,
    animating: HashSet<usize>,
    max_spikes: usize,
    spawn_probability: f32,
    peak: Range<f32>,
    speed: Range<f32>,
}

impl SpikeAnimator {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            spikes: Vec::new(),
            animating: HashSet::new(),
            max_spikes: config.max_spikes,
            spawn_probability: config.spawn_probability,
            peak: config.spike_peak.clone(),
            speed: config.spike_speed.clone(),
        }
    }

    pub fn spikes(&self) -> &[Spike] {
        &self.spikes
    }

    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    pub fn is_animating(&self, vertex: usize) -> bool {
        self.animating.contains(&vertex)
    }

    /// Runs one frame: maybe spawns a spike, then advances all of them and
    /// writes their lengths into `mesh`.
    pub fn step(&mut self, mesh: &mut IcoSphere, rng: &mut impl Rng) {
        let want_spawn = self.spikes.is_empty()
            || (self.spikes.len() < self.max_spikes && rng.gen::<f32>() < self.spawn_probability);
        if want_spawn && self.spikes.len() < self.max_spikes {
            self.spawn(mesh, rng);
        }
        self.advance(mesh);
    }

    /// Starts a spike on a random idle vertex. Returns `None` when every
    /// vertex is already animating.
    pub fn spawn(&mut self, mesh: &IcoSphere, rng: &mut impl Rng) -> Option<usize> {
        let vertex_count = mesh.vertex_count();
        if self.animating.len() >= vertex_count {
            return None;
        }

        let vertex = loop {
            let candidate = rng.gen_range(0..vertex_count);
            if !self.animating.contains(&candidate) {
                break candidate;
            }
        };

        self.animating.insert(vertex);
        self.spikes.push(Spike {
            vertex,
            length: mesh.base_radius(),
            phase: Phase::Outbound,
            peak: rng.gen_range(self.peak.clone()),
            speed: rng.gen_range(self.speed.clone()),
        });
        log::trace!("spike started on vertex {vertex}");
        Some(vertex)
    }

    /// Advances every spike one frame, dropping the ones that have landed.
    pub fn advance(&mut self, mesh: &mut IcoSphere) {
        let base = mesh.base_radius();
        let animating = &mut self.animating;
        self.spikes.retain_mut(|spike| {
            let alive = spike.step(base);
            mesh.set_radius(spike.vertex, spike.length);
            if !alive {
                animating.remove(&spike.vertex);
            }
            alive
        });
    }

    /// Drops every spike and snaps its vertex back to the base radius.
    pub fn reset(&mut self, mesh: &mut IcoSphere) {
        let base = mesh.base_radius();
        for spike in self.spikes.drain(..) {
            mesh.set_radius(spike.vertex, base);
        }
        self.animating.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn setup(config: &DemoConfig) -> (IcoSphere, SpikeAnimator, SmallRng) {
        (
            IcoSphere::new(config.base_radius, config.detail),
            SpikeAnimator::new(config),
            SmallRng::seed_from_u64(11),
        )
    }

    #[test]
    fn outbound_then_returning_then_removed() {
        let mut spike = Spike {
            vertex: 0,
            length: 10.0,
            phase: Phase::Outbound,
            peak: 10.25,
            speed: 0.1,
        };
        assert!(spike.step(10.0));
        assert!(spike.step(10.0));
        assert_eq!(spike.phase, Phase::Outbound);
        assert!(spike.step(10.0));
        assert_eq!(spike.length, 10.25);
        assert_eq!(spike.phase, Phase::Returning);

        let mut frames = 0;
        while spike.step(10.0) {
            frames += 1;
            assert!(spike.length > 10.0);
        }
        assert_eq!(frames, 2);
        assert_eq!(spike.length, 10.0);
    }

    #[test]
    fn huge_cap_allocates_lazily() {
        let config = DemoConfig {
            max_spikes: usize::MAX,
            spawn_probability: 1.0,
            ..DemoConfig::default()
        };
        let (mut mesh, mut spikes, mut rng) = setup(&config);
        for _ in 0..200 {
            spikes.step(&mut mesh, &mut rng);
        }
        assert!(spikes.len() <= mesh.vertex_count());
    }

    #[test]
    fn first_frame_always_spawns() {
        let config = DemoConfig {
            spawn_probability: 0.0,
            ..DemoConfig::default()
        };
        let (mut mesh, mut spikes, mut rng) = setup(&config);
        spikes.step(&mut mesh, &mut rng);
        assert_eq!(spikes.len(), 1);
        let vertex = spikes.spikes()[0].vertex;
        assert!(spikes.is_animating(vertex));
        assert!(mesh.radius(vertex) > config.base_radius);
    }

    #[test]
    fn never_exceeds_cap() {
        let config = DemoConfig {
            spawn_probability: 1.0,
            ..DemoConfig::default()
        };
        let (mut mesh, mut spikes, mut rng) = setup(&config);
        for _ in 0..2000 {
            spikes.step(&mut mesh, &mut rng);
            assert!(spikes.len() <= 12);
        }
    }

    #[test]
    fn lengths_stay_within_bounds_and_vertices_unique() {
        let config = DemoConfig {
            spawn_probability: 0.5,
            ..DemoConfig::default()
        };
        let (mut mesh, mut spikes, mut rng) = setup(&config);
        for _ in 0..3000 {
            spikes.step(&mut mesh, &mut rng);
            let mut seen = HashSet::new();
            for spike in spikes.spikes() {
                assert!(spike.length >= config.base_radius);
                assert!(spike.length <= spike.peak);
                assert!(seen.insert(spike.vertex), "vertex {} animated twice", spike.vertex);
                assert_eq!(mesh.radius(spike.vertex), spike.length);
            }
            for v in 0..mesh.vertex_count() {
                if !spikes.is_animating(v) {
                    assert_eq!(mesh.radius(v), config.base_radius);
                }
            }
        }
    }

    #[test]
    fn spawn_refuses_when_every_vertex_is_busy() {
        let config = DemoConfig {
            detail: 0,
            max_spikes: 100,
            ..DemoConfig::default()
        };
        let (mesh, mut spikes, mut rng) = setup(&config);
        for _ in 0..mesh.vertex_count() {
            assert!(spikes.spawn(&mesh, &mut rng).is_some());
        }
        assert_eq!(spikes.spawn(&mesh, &mut rng), None);
    }

    #[test]
    fn reset_restores_base_radius() {
        let config = DemoConfig {
            spawn_probability: 1.0,
            ..DemoConfig::default()
        };
        let (mut mesh, mut spikes, mut rng) = setup(&config);
        for _ in 0..30 {
            spikes.step(&mut mesh, &mut rng);
        }
        let touched: Vec<usize> = spikes.spikes().iter().map(|s| s.vertex).collect();
        assert!(!touched.is_empty());

        spikes.reset(&mut mesh);
        assert!(spikes.is_empty());
        for v in touched {
            assert_eq!(mesh.radius(v), config.base_radius);
            assert!(!spikes.is_animating(v));
        }
    }
}
