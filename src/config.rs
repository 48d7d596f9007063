use crate::canvas::Rgb;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Every tunable of the effect. Persisted as JSON; CLI flags override
/// per run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Config {
    /// Bounds for the randomized delay between strikes.
    pub(crate) min_strike_interval_ms: u64,
    pub(crate) max_strike_interval_ms: u64,

    /// Screen flash peak on spawn (0-1) and per-frame decay factor.
    pub(crate) flash_intensity: f32,
    pub(crate) flash_decay: f32,

    /// Bolt body color, halo color, halo strength (0-1).
    pub(crate) bolt_color: Rgb,
    pub(crate) bolt_glow: Rgb,
    pub(crate) glow_intensity: f32,

    /// Main path thickness in subpixels; branches get half.
    pub(crate) main_bolt_thickness: f32,
    /// Chance of forking at each interior point of the main path.
    pub(crate) branch_probability: f32,
    pub(crate) max_branches: u32,
    /// Step length of the walk, in subpixels.
    pub(crate) segment_length: f32,
    /// Lateral jitter scale (0-1), applied at half strength vertically.
    pub(crate) jaggedness: f32,

    /// Background charge haze.
    pub(crate) ambient_particles: bool,
    /// Particles per subpixel of viewport area.
    pub(crate) particle_density: f32,
    pub(crate) particle_color: Rgb,
    /// Radial-gradient rendering; plain squares when off.
    pub(crate) particle_glow: bool,

    pub(crate) fps_cap: u32,
    /// 0 means seed from entropy.
    pub(crate) seed: u64,
    pub(crate) theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_strike_interval_ms: 2000,
            max_strike_interval_ms: 6000,
            flash_intensity: 0.15,
            flash_decay: 0.92,
            bolt_color: Rgb {
                r: 150,
                g: 200,
                b: 255,
            },
            bolt_glow: Rgb {
                r: 100,
                g: 150,
                b: 255,
            },
            glow_intensity: 0.6,
            main_bolt_thickness: 3.0,
            branch_probability: 0.3,
            max_branches: 2,
            segment_length: 15.0,
            jaggedness: 0.6,
            ambient_particles: true,
            // Tuned for braille resolution; a full-screen terminal is a
            // few tens of thousands of subpixels, not a megapixel canvas.
            particle_density: 0.0015,
            particle_color: Rgb {
                r: 180,
                g: 220,
                b: 255,
            },
            particle_glow: true,
            fps_cap: 60,
            seed: 0,
            theme: "storm".to_string(),
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) name: &'static str,
    pub(crate) bolt: Rgb,
    pub(crate) glow: Rgb,
    pub(crate) particle: Rgb,
}

pub(crate) const THEMES: [Theme; 5] = [
    Theme {
        name: "storm",
        bolt: Rgb {
            r: 150,
            g: 200,
            b: 255,
        },
        glow: Rgb {
            r: 100,
            g: 150,
            b: 255,
        },
        particle: Rgb {
            r: 180,
            g: 220,
            b: 255,
        },
    },
    Theme {
        name: "ember",
        bolt: Rgb {
            r: 255,
            g: 180,
            b: 110,
        },
        glow: Rgb {
            r: 255,
            g: 110,
            b: 50,
        },
        particle: Rgb {
            r: 255,
            g: 200,
            b: 140,
        },
    },
    Theme {
        name: "emerald",
        bolt: Rgb {
            r: 150,
            g: 255,
            b: 200,
        },
        glow: Rgb {
            r: 80,
            g: 220,
            b: 150,
        },
        particle: Rgb {
            r: 170,
            g: 255,
            b: 215,
        },
    },
    Theme {
        name: "violet",
        bolt: Rgb {
            r: 210,
            g: 160,
            b: 255,
        },
        glow: Rgb {
            r: 170,
            g: 90,
            b: 255,
        },
        particle: Rgb {
            r: 225,
            g: 185,
            b: 255,
        },
    },
    Theme {
        name: "mono",
        bolt: Rgb {
            r: 235,
            g: 235,
            b: 235,
        },
        glow: Rgb {
            r: 160,
            g: 160,
            b: 170,
        },
        particle: Rgb {
            r: 200,
            g: 200,
            b: 205,
        },
    },
];

pub(crate) fn theme_index(name: &str) -> usize {
    THEMES.iter().position(|t| t.name == name).unwrap_or(0)
}

pub(crate) fn apply_theme(cfg: &mut Config, index: usize) {
    let t = THEMES[index % THEMES.len()];
    cfg.theme = t.name.to_string();
    cfg.bolt_color = t.bolt;
    cfg.bolt_glow = t.glow;
    cfg.particle_color = t.particle;
}

pub(crate) struct Paths {
    pub(crate) config_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "stormfield", "Stormfield")
        .context("could not resolve project directories")?;
    let dir = proj.config_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        config_path: dir.join("config.json"),
    })
}

pub(crate) fn load_config(path: &Path) -> Config {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Config>(&s) {
            return v;
        }
    }
    Config::default()
}

pub(crate) fn save_config_atomic(path: &Path, cfg: &Config) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(cfg)?;
    fs::write(&tmp, data)?;
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// --fps N --seed N --density F --theme NAME --no-particles
pub(crate) fn apply_cli_args(cfg: &mut Config) {
    let mut it = env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--fps" => {
                if let Some(v) = it.next() {
                    cfg.fps_cap = v.parse().unwrap_or(cfg.fps_cap);
                }
            }
            "--seed" => {
                if let Some(v) = it.next() {
                    cfg.seed = v.parse().unwrap_or(cfg.seed);
                }
            }
            "--density" => {
                if let Some(v) = it.next() {
                    cfg.particle_density = v.parse().unwrap_or(cfg.particle_density);
                }
            }
            "--theme" => {
                if let Some(v) = it.next() {
                    apply_theme(cfg, theme_index(&v));
                }
            }
            "--no-particles" => cfg.ambient_particles = false,
            "--help" | "-h" => {
                println!(
                    "stormfield\n\n\
                     Usage:\n\
                     \tstormfield [--fps N] [--seed N] [--density F] [--theme NAME] [--no-particles]\n\n\
                     Themes: storm ember emerald violet mono\n\n\
                     Controls:\n\
                     \tQ / Esc quit\n\
                     \tSpace pause\n\
                     \tN single step while paused\n\
                     \tL force a strike\n\
                     \tC cycle theme\n\
                     \tP particles toggle\n\
                     \tR regenerate particles\n\
                     \tH help overlay\n"
                );
                std::process::exit(0);
            }
            _ => {}
        }
    }
}
