//! HSL colors with a drifting hue.

/// Color in hue/saturation/lightness, every component in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Linear RGB triple as uploaded to the color attribute.
    pub fn to_rgb(self) -> [f32; 3] {
        hsl_to_rgb(self.h, self.s, self.l)
    }
}

/// Opaque white, drawn when no color mode is active.
pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Advances `hue` by `velocity`, wrapping into `[0, 1)`.
pub fn drift_hue(hue: f32, velocity: f32) -> f32 {
    let h = (hue + velocity).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if h >= 1.0 {
        0.0
    } else {
        h
    }
}

/// A color together with the rate its hue drifts at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftingColor {
    pub color: Hsl,
    /// Hue units per frame.
    pub velocity: f32,
}

impl DriftingColor {
    pub fn advance(&mut self) {
        self.color.h = drift_hue(self.color.h, self.velocity);
    }
}

/// HSL to RGB conversion. `h` is a fraction of a full turn.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn grey_ignores_hue() {
        assert!(close(hsl_to_rgb(0.42, 0.0, 0.25), [0.25; 3]));
        assert!(close(Hsl::new(0.9, 0.0, 1.0).to_rgb(), WHITE));
    }

    #[test]
    fn drift_stays_in_unit_interval() {
        let mut h = 0.0_f32;
        while h < 1.0 {
            let mut v = 0.0_f32;
            while v <= 0.003 {
                let next = drift_hue(h, v);
                assert!((0.0..1.0).contains(&next), "h={h} v={v} -> {next}");
                v += 0.0005;
            }
            h += 0.0137;
        }
        assert!((0.0..1.0).contains(&drift_hue(0.999_999_9, 0.003)));
    }

    #[test]
    fn drift_wraps_past_one() {
        let h = drift_hue(0.999, 0.003);
        assert!((h - 0.002).abs() < 1e-5);
    }

    #[test]
    fn drifting_color_keeps_saturation_and_lightness() {
        let mut c = DriftingColor {
            color: Hsl::new(0.5, 0.7, 0.4),
            velocity: 0.25,
        };
        c.advance();
        c.advance();
        assert_eq!(c.color, Hsl::new(0.0, 0.7, 0.4));
    }
}
