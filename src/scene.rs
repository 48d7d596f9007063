use crate::canvas::{Rgb, Surface};
use crate::config::Config;
use crate::effects::{regenerate_particles, AmbientParticle, ScreenFlash, Strike};
use rand::{rngs::StdRng, Rng};

/// All mutable animation state: the live strike pool, the particle
/// haze, the flash scalar and the next-spawn deadline. One `tick` per
/// displayed frame; the host owns the clock and the surface.
pub(crate) struct Storm {
    width: f32,
    height: f32,
    strikes: Vec<Strike>,
    particles: Vec<AmbientParticle>,
    flash: ScreenFlash,
    next_spawn_at_ms: f64,
    rng: StdRng,
}

impl Storm {
    pub(crate) fn new(width: f32, height: f32, now_ms: f64, cfg: &Config, mut rng: StdRng) -> Self {
        let particles = regenerate_particles(width, height, cfg, &mut rng);
        let next_spawn_at_ms = now_ms + spawn_delay(cfg, &mut rng);
        Self {
            width,
            height,
            strikes: Vec::new(),
            particles,
            flash: ScreenFlash::new(),
            next_spawn_at_ms,
            rng,
        }
    }

    /// Resyncs to a new viewport. The old particle population is
    /// discarded, not rescaled; safe to call repeatedly.
    pub(crate) fn resize(&mut self, width: f32, height: f32, cfg: &Config) {
        self.width = width;
        self.height = height;
        self.particles = regenerate_particles(width, height, cfg, &mut self.rng);
    }

    /// Spawns immediately, outside the schedule, and re-arms it.
    pub(crate) fn force_strike(&mut self, now_ms: f64, cfg: &Config) {
        self.spawn_strike(now_ms, cfg);
    }

    pub(crate) fn strike_count(&self) -> usize {
        self.strikes.len()
    }

    pub(crate) fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub(crate) fn flash_intensity(&self) -> f32 {
        self.flash.intensity
    }

    /// One frame: clear, particles, strikes (update+draw+prune in a
    /// single pass), flash overlay, then the spawn check.
    pub(crate) fn tick<S: Surface>(&mut self, now_ms: f64, dt_ms: f32, cfg: &Config, surface: &mut S) {
        surface.clear();

        if cfg.ambient_particles {
            let (w, h) = (self.width, self.height);
            for p in self.particles.iter_mut() {
                p.update(w, h);
                p.draw(surface, cfg);
            }
        }

        self.strikes.retain_mut(|strike| {
            let alive = strike.update(dt_ms);
            if alive {
                strike.draw(surface, cfg);
            }
            alive
        });

        if self.flash.is_lit() {
            surface.fill_rect(
                0.0,
                0.0,
                self.width,
                self.height,
                Rgb::WHITE,
                self.flash.intensity,
            );
            self.flash.decay(cfg.flash_decay);
        }

        // At most one catch-up spawn per tick, however far the clock
        // jumped past the deadline.
        if now_ms >= self.next_spawn_at_ms {
            self.spawn_strike(now_ms, cfg);
        }
    }

    fn spawn_strike(&mut self, now_ms: f64, cfg: &Config) {
        self.strikes
            .push(Strike::spawn(self.width, self.height, cfg, &mut self.rng));
        self.flash.trigger(cfg.flash_intensity);
        self.next_spawn_at_ms = now_ms + spawn_delay(cfg, &mut self.rng);
    }
}

fn spawn_delay(cfg: &Config, rng: &mut StdRng) -> f64 {
    let min = cfg.min_strike_interval_ms as f64;
    let max = cfg.max_strike_interval_ms as f64;
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
