use crate::canvas::BrailleCanvas;
use crate::config::{
    apply_cli_args, apply_theme, load_config, project_paths, save_config_atomic, theme_index,
    Config, THEMES,
};
use crate::input::{collect_actions, Action};
use crate::render::{canvas_to_cells, draw_center_box, draw_text, Terminal};
use crate::scene::Storm;
use crossterm::style::Color;
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};

pub(crate) fn run() -> anyhow::Result<()> {
    let paths = project_paths()?;
    let mut cfg = load_config(&paths.config_path);
    apply_cli_args(&mut cfg);

    let mut term = Terminal::begin()?;
    let res = App::new(&mut term, &mut cfg).and_then(|app| app.run());
    term.end()?;

    save_config_atomic(&paths.config_path, &cfg)?;
    res
}

struct App<'a> {
    term: &'a mut Terminal,
    cfg: &'a mut Config,
    canvas: BrailleCanvas,
    storm: Storm,
    start: Instant,
    paused: bool,
    step_once: bool,
    show_help: bool,
    sim_now_ms: f64,
    fps_smooth: f32,
}

impl<'a> App<'a> {
    fn new(term: &'a mut Terminal, cfg: &'a mut Config) -> anyhow::Result<Self> {
        let rng = if cfg.seed != 0 {
            StdRng::seed_from_u64(cfg.seed)
        } else {
            StdRng::from_entropy()
        };

        let (w, h) = subpixel_dims(term);
        let canvas = BrailleCanvas::new(w, h);
        let storm = Storm::new(w as f32, h as f32, 0.0, cfg, rng);

        Ok(Self {
            term,
            cfg,
            canvas,
            storm,
            start: Instant::now(),
            paused: false,
            step_once: false,
            show_help: false,
            sim_now_ms: 0.0,
            fps_smooth: 60.0,
        })
    }

    fn run(mut self) -> anyhow::Result<()> {
        let mut last = Instant::now();

        loop {
            let frame_start = Instant::now();

            if self.term.resize_if_needed()? {
                let (w, h) = subpixel_dims(self.term);
                self.canvas = BrailleCanvas::new(w, h);
                self.storm.resize(w as f32, h as f32, self.cfg);
            }

            for action in collect_actions()? {
                match action {
                    Action::Quit => return Ok(()),
                    Action::PauseToggle => self.paused = !self.paused,
                    Action::StepOnce => {
                        if self.paused {
                            self.step_once = true;
                        }
                    }
                    Action::ForceStrike => self.storm.force_strike(self.sim_now_ms, self.cfg),
                    Action::CycleTheme => {
                        let next = theme_index(&self.cfg.theme) + 1;
                        apply_theme(self.cfg, next);
                    }
                    Action::ParticlesToggle => {
                        self.cfg.ambient_particles = !self.cfg.ambient_particles;
                    }
                    Action::ReseedParticles => {
                        let (w, h) = subpixel_dims(self.term);
                        self.storm.resize(w as f32, h as f32, self.cfg);
                    }
                    Action::HelpToggle => self.show_help = !self.show_help,
                }
            }

            let now = Instant::now();
            let dt_ms = (now - last).as_secs_f32() * 1000.0;
            last = now;

            if dt_ms > 0.5 {
                self.fps_smooth = self.fps_smooth * 0.9 + (1000.0 / dt_ms) * 0.1;
            }

            // The sim clock only advances while running, so pausing
            // freezes both fading and the strike schedule.
            let do_sim = !self.paused || self.step_once;
            self.step_once = false;
            if do_sim {
                self.sim_now_ms += dt_ms as f64;
                self.storm
                    .tick(self.sim_now_ms, dt_ms, self.cfg, &mut self.canvas);
            }

            self.term.cur.clear();
            canvas_to_cells(&self.canvas, &mut self.term.cur);
            self.draw_hud();
            if self.show_help {
                self.draw_help();
            }
            self.term.present()?;

            sleep_to_cap(frame_start, self.cfg.fps_cap);
        }
    }

    fn draw_hud(&mut self) {
        let hud = format!(
            "stormfield  strikes:{}  particles:{}  theme:{}  fps:{:.0}  {}  (Q quit, H help)",
            self.storm.strike_count(),
            if self.cfg.ambient_particles {
                self.storm.particle_count()
            } else {
                0
            },
            self.cfg.theme,
            self.fps_smooth,
            if self.paused { "paused" } else { "running" },
        );
        draw_text(&mut self.term.cur, 0, 0, &hud, Color::DarkGrey);
    }

    fn draw_help(&mut self) {
        let themes = THEMES.map(|t| t.name).join(" ");
        let body = format!(
            "Q / Esc   Quit\n\
             Space     Pause\n\
             N         Single step while paused\n\
             L         Force a strike now\n\
             C         Cycle theme ({themes})\n\
             P         Toggle ambient particles\n\
             R         Regenerate particles\n\
             H         Toggle this overlay"
        );
        draw_center_box(&mut self.term.cur, "HELP", &body);
    }
}

fn subpixel_dims(term: &Terminal) -> (usize, usize) {
    // Braille: 2x4 dots per cell. The HUD overdraws row 0 afterwards.
    let cols = term.cols.max(10) as usize;
    let rows = term.rows.max(6) as usize;
    (cols * 2, rows * 4)
}

fn sleep_to_cap(frame_start: Instant, fps: u32) {
    let frame = Duration::from_secs_f32(1.0 / fps.max(1) as f32);
    let elapsed = frame_start.elapsed();
    if elapsed < frame {
        std::thread::sleep(frame - elapsed);
    }
}
