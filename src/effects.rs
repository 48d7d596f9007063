use crate::bolt::{generate_bolt, BoltSegment, Point};
use crate::canvas::{GlowStyle, Rgb, StrokeStyle, Surface};
use crate::config::Config;
use rand::{rngs::StdRng, Rng};

// Halo spread around bolt strokes, in subpixels.
const BOLT_GLOW_RADIUS: f32 = 5.0;

/// One lightning bolt with a bounded on-screen lifetime. Geometry is
/// generated once at spawn; only age and the derived opacity change.
pub(crate) struct Strike {
    pub(crate) segments: Vec<BoltSegment>,
    pub(crate) age_ms: f32,
    pub(crate) max_age_ms: f32,
    pub(crate) opacity: f32,
}

impl Strike {
    pub(crate) fn spawn(width: f32, height: f32, cfg: &Config, rng: &mut StdRng) -> Self {
        // Start above the top edge, strike down into the lower 70%.
        let origin = Point::new(rng.gen::<f32>() * width, -20.0);
        let target = Point::new(
            origin.x + (rng.gen::<f32>() - 0.5) * width * 0.4,
            rng.gen::<f32>() * height * 0.7 + height * 0.3,
        );

        Self {
            segments: generate_bolt(origin, target, cfg, rng),
            age_ms: 0.0,
            max_age_ms: 200.0 + rng.gen::<f32>() * 200.0,
            opacity: 1.0,
        }
    }

    /// Ages the strike; false once it has fully faded.
    pub(crate) fn update(&mut self, dt_ms: f32) -> bool {
        self.age_ms += dt_ms;
        self.opacity = (1.0 - self.age_ms / self.max_age_ms).max(0.0);
        self.opacity > 0.0
    }

    pub(crate) fn draw<S: Surface>(&self, surface: &mut S, cfg: &Config) {
        for seg in &self.segments {
            let opacity = self.opacity * if seg.is_branch { 0.7 } else { 1.0 };

            surface.stroke_polyline(
                &seg.path,
                StrokeStyle {
                    width: seg.thickness,
                    color: cfg.bolt_color,
                    alpha: opacity,
                    glow: Some(GlowStyle {
                        color: cfg.bolt_glow,
                        alpha: cfg.glow_intensity * opacity,
                        radius: BOLT_GLOW_RADIUS,
                    }),
                },
            );

            // Hot core over the halo.
            surface.stroke_polyline(
                &seg.path,
                StrokeStyle {
                    width: seg.thickness * 0.3,
                    color: Rgb::WHITE,
                    alpha: opacity * 0.8,
                    glow: None,
                },
            );
        }
    }
}

/// A drifting, pulsing point of charge. Never expires; wraps at the
/// edges and gets regenerated wholesale on resize.
pub(crate) struct AmbientParticle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) size: f32,
    pub(crate) opacity: f32,
    pulse_rate: f32,
    pulse_phase: f32,
    drift_x: f32,
    drift_y: f32,
}

impl AmbientParticle {
    pub(crate) fn spawn(width: f32, height: f32, rng: &mut StdRng) -> Self {
        Self {
            x: rng.gen::<f32>() * width,
            y: rng.gen::<f32>() * height,
            size: rng.gen::<f32>() * 2.0 + 0.5,
            opacity: rng.gen::<f32>() * 0.3 + 0.1,
            pulse_rate: rng.gen::<f32>() * 0.02 + 0.01,
            pulse_phase: rng.gen::<f32>() * std::f32::consts::TAU,
            drift_x: (rng.gen::<f32>() - 0.5) * 0.2,
            drift_y: (rng.gen::<f32>() - 0.5) * 0.2,
        }
    }

    pub(crate) fn update(&mut self, width: f32, height: f32) {
        self.x += self.drift_x;
        self.y += self.drift_y;
        self.pulse_phase += self.pulse_rate;

        // Wrap keeping both axes in [0, dim).
        if self.x < 0.0 {
            self.x += width;
        } else if self.x >= width {
            self.x -= width;
        }
        if self.y < 0.0 {
            self.y += height;
        } else if self.y >= height {
            self.y -= height;
        }
    }

    pub(crate) fn draw<S: Surface>(&self, surface: &mut S, cfg: &Config) {
        let pulse = self.pulse_phase.sin() * 0.5 + 0.5;
        let alpha = self.opacity * pulse;

        if cfg.particle_glow {
            surface.fill_radial(self.x, self.y, self.size * 3.0, cfg.particle_color, alpha);
        } else {
            surface.fill_rect(self.x, self.y, self.size, self.size, cfg.particle_color, alpha);
        }
    }
}

pub(crate) fn regenerate_particles(
    width: f32,
    height: f32,
    cfg: &Config,
    rng: &mut StdRng,
) -> Vec<AmbientParticle> {
    let count = (width * height * cfg.particle_density).floor() as usize;
    (0..count)
        .map(|_| AmbientParticle::spawn(width, height, rng))
        .collect()
}

/// The ambient light flash a strike throws across the whole surface.
/// Peaks on spawn, then decays geometrically with a snap to zero so the
/// tail does not linger forever.
pub(crate) struct ScreenFlash {
    pub(crate) intensity: f32,
}

const FLASH_FLOOR: f32 = 0.001;

impl ScreenFlash {
    pub(crate) fn new() -> Self {
        Self { intensity: 0.0 }
    }

    pub(crate) fn trigger(&mut self, peak: f32) {
        self.intensity = peak;
    }

    pub(crate) fn decay(&mut self, factor: f32) {
        self.intensity *= factor;
        if self.intensity < FLASH_FLOOR {
            self.intensity = 0.0;
        }
    }

    pub(crate) fn is_lit(&self) -> bool {
        self.intensity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn strike_opacity_fades_monotonically_to_zero() {
        let cfg = Config::default();
        let mut s = Strike::spawn(400.0, 200.0, &cfg, &mut rng(7));

        let mut prev = s.opacity;
        let mut alive = true;
        let mut ticks = 0;
        while alive {
            alive = s.update(16.0);
            assert!(s.opacity <= prev);
            prev = s.opacity;
            ticks += 1;
            assert!(ticks < 100, "strike never expired");
        }
        assert_eq!(s.opacity, 0.0);
        assert!(s.age_ms >= s.max_age_ms);
    }

    #[test]
    fn strike_max_age_is_within_the_spawn_range() {
        let cfg = Config::default();
        for seed in 0..10 {
            let s = Strike::spawn(400.0, 200.0, &cfg, &mut rng(seed));
            assert!(s.max_age_ms >= 200.0 && s.max_age_ms < 400.0);
        }
    }

    #[test]
    fn strike_target_lands_in_lower_seventy_percent() {
        let cfg = Config::default();
        for seed in 0..20 {
            let s = Strike::spawn(400.0, 200.0, &cfg, &mut rng(seed));
            let main = &s.segments[0].path;
            let end = main.last().unwrap();
            assert!(end.y >= 200.0 * 0.3 && end.y <= 200.0);
            assert_eq!(main.first().unwrap().y, -20.0);
        }
    }

    #[test]
    fn particle_count_follows_area_density() {
        let mut cfg = Config::default();
        cfg.particle_density = 0.00003;
        let particles = regenerate_particles(800.0, 600.0, &cfg, &mut rng(8));
        assert_eq!(particles.len(), 14); // floor(800*600*0.00003)
    }

    #[test]
    fn particle_wraparound_stays_in_bounds() {
        let (w, h) = (50.0, 30.0);
        let mut r = rng(9);
        let mut particles = regenerate_particles(w, h, &Config::default(), &mut r);
        for _ in 0..5000 {
            for p in particles.iter_mut() {
                p.update(w, h);
                assert!(p.x >= 0.0 && p.x < w, "x out of range: {}", p.x);
                assert!(p.y >= 0.0 && p.y < h, "y out of range: {}", p.y);
            }
        }
    }

    #[test]
    fn flash_decays_geometrically_then_snaps_to_zero() {
        let mut flash = ScreenFlash::new();
        assert!(!flash.is_lit());

        flash.trigger(0.15);
        let mut expected = 0.15;
        for _ in 0..3 {
            flash.decay(0.92);
            expected *= 0.92;
            assert!((flash.intensity - expected).abs() < 1e-6);
        }

        let mut steps = 0;
        while flash.is_lit() {
            flash.decay(0.92);
            assert!(flash.intensity >= 0.0);
            steps += 1;
            assert!(steps < 200, "flash never reached zero");
        }
        assert_eq!(flash.intensity, 0.0);

        // Stays at zero until re-triggered.
        flash.decay(0.92);
        assert_eq!(flash.intensity, 0.0);
        flash.trigger(0.15);
        assert!(flash.is_lit());
    }
}
