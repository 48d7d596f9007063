use crate::config::Config;
use rand::{rngs::StdRng, Rng};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Point {
    pub(crate) fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One polyline of a bolt. The main segment runs origin -> target;
/// branches fork off an interior point of the main path.
#[derive(Clone, Debug)]
pub(crate) struct BoltSegment {
    pub(crate) path: Vec<Point>,
    pub(crate) thickness: f32,
    pub(crate) is_branch: bool,
}

/// Builds the full segment list for one strike: a jagged main path from
/// `origin` to `target`, plus stochastic branches. The main path always
/// ends at `target` exactly, whatever the jitter did along the way.
pub(crate) fn generate_bolt(
    origin: Point,
    target: Point,
    cfg: &Config,
    rng: &mut StdRng,
) -> Vec<BoltSegment> {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let steps = (origin.distance(target) / cfg.segment_length).floor() as u32;

    let mut main_path = Vec::with_capacity(steps as usize + 2);
    main_path.push(origin);

    for i in 0..steps {
        let progress = (i + 1) as f32 / steps as f32;

        let jitter_x = (rng.gen::<f32>() - 0.5) * cfg.segment_length * cfg.jaggedness;
        let jitter_y = (rng.gen::<f32>() - 0.5) * cfg.segment_length * cfg.jaggedness * 0.5;

        main_path.push(Point::new(
            origin.x + dx * progress + jitter_x,
            origin.y + dy * progress + jitter_y,
        ));
    }

    // Terminate at the target verbatim; a zero-step bolt degenerates to
    // the two-point path [origin, target].
    main_path.push(target);

    let mut segments = Vec::new();
    segments.push(BoltSegment {
        path: main_path.clone(),
        thickness: cfg.main_bolt_thickness,
        is_branch: false,
    });

    generate_branches(&main_path, cfg, rng, &mut segments);
    segments
}

fn generate_branches(
    main_path: &[Point],
    cfg: &Config,
    rng: &mut StdRng,
    out: &mut Vec<BoltSegment>,
) {
    for i in 1..main_path.len().saturating_sub(1) {
        if rng.gen::<f32>() >= cfg.branch_probability {
            continue;
        }

        let num_branches = rng.gen_range(1..=cfg.max_branches.max(1));
        for _ in 0..num_branches {
            let fork = main_path[i];
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let branch_steps = rng.gen_range(3..=8);

            let mut path = Vec::with_capacity(branch_steps + 1);
            path.push(fork);

            let mut bx = fork.x;
            let mut by = fork.y;
            for _ in 0..branch_steps {
                bx += angle.cos() * cfg.segment_length * 0.7 + (rng.gen::<f32>() - 0.5) * 10.0;
                by += angle.sin() * cfg.segment_length * 0.7 + (rng.gen::<f32>() - 0.5) * 10.0;
                path.push(Point::new(bx, by));
            }

            out.push(BoltSegment {
                path,
                thickness: cfg.main_bolt_thickness * 0.5,
                is_branch: true,
            });
        }
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
    fn main_path_spans_origin_to_target_exactly() {
        let cfg = Config::default();
        for seed in 0..20 {
            let origin = Point::new(120.0, -20.0);
            let target = Point::new(180.0, 150.0);
            let segments = generate_bolt(origin, target, &cfg, &mut rng(seed));

            let main = &segments[0];
            assert!(!main.is_branch);
            assert_eq!(*main.path.first().unwrap(), origin);
            assert_eq!(*main.path.last().unwrap(), target);
        }
    }

    #[test]
    fn zero_distance_yields_minimal_bolt() {
        let cfg = Config::default();
        let p = Point::new(40.0, 40.0);
        let segments = generate_bolt(p, p, &cfg, &mut rng(1));

        assert_eq!(segments[0].path, vec![p, p]);
    }

    #[test]
    fn short_bolt_has_no_interior_points_and_no_branches() {
        let cfg = Config::default();
        // Closer than one segment length: steps == 0, nothing to fork from.
        let origin = Point::new(0.0, 0.0);
        let target = Point::new(cfg.segment_length * 0.5, 0.0);
        let segments = generate_bolt(origin, target, &cfg, &mut rng(2));

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].path.len(), 2);
    }

    #[test]
    fn branch_segments_are_tagged_and_half_thickness() {
        let mut cfg = Config::default();
        cfg.branch_probability = 1.0;

        let origin = Point::new(100.0, 0.0);
        let target = Point::new(100.0, 300.0);
        let segments = generate_bolt(origin, target, &cfg, &mut rng(3));

        let branches: Vec<_> = segments.iter().filter(|s| s.is_branch).collect();
        assert!(!branches.is_empty());
        for b in &branches {
            assert_eq!(b.thickness, cfg.main_bolt_thickness * 0.5);
            assert!(b.path.len() >= 2);
        }
    }

    #[test]
    fn branches_fork_from_interior_main_points() {
        let mut cfg = Config::default();
        cfg.branch_probability = 1.0;

        let origin = Point::new(50.0, 0.0);
        let target = Point::new(50.0, 200.0);
        let segments = generate_bolt(origin, target, &cfg, &mut rng(4));

        let main = segments[0].path.clone();
        let interior = &main[1..main.len() - 1];
        for b in segments.iter().filter(|s| s.is_branch) {
            assert!(interior.contains(&b.path[0]));
        }
    }

    #[test]
    fn no_branches_when_probability_is_zero() {
        let mut cfg = Config::default();
        cfg.branch_probability = 0.0;

        let origin = Point::new(0.0, 0.0);
        let target = Point::new(0.0, 400.0);
        let segments = generate_bolt(origin, target, &cfg, &mut rng(5));

        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn step_count_follows_segment_length() {
        let cfg = Config::default();
        let origin = Point::new(0.0, 0.0);
        let target = Point::new(0.0, cfg.segment_length * 10.0);
        let segments = generate_bolt(origin, target, &cfg, &mut rng(6));

        // origin + 10 interpolated points + target
        assert_eq!(segments[0].path.len(), 12);
    }
}
