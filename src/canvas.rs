use crate::bolt::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// Soft halo around a stroke, the shadow-blur analogue.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GlowStyle {
    pub(crate) color: Rgb,
    pub(crate) alpha: f32,
    pub(crate) radius: f32,
}

/// One stroke call carries its entire style; nothing persists on the
/// surface between calls.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StrokeStyle {
    pub(crate) width: f32,
    pub(crate) color: Rgb,
    pub(crate) alpha: f32,
    pub(crate) glow: Option<GlowStyle>,
}

/// Immediate-mode 2D raster target the simulation draws into.
pub(crate) trait Surface {
    fn clear(&mut self);
    fn stroke_polyline(&mut self, path: &[Point], style: StrokeStyle);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32);
    fn fill_radial(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32);
}

/// Additive RGB energy buffer in braille subpixel resolution
/// (2x4 dots per terminal cell). Deposits accumulate and are clamped;
/// the renderer thresholds them into dot masks and cell colors.
pub(crate) struct BrailleCanvas {
    pub(crate) w: usize,
    pub(crate) h: usize,
    pub(crate) px: Vec<[f32; 3]>,
}

const ENERGY_CAP: f32 = 4.0;

// Sample spacing along strokes, in subpixels.
const STROKE_STEP: f32 = 0.6;

impl BrailleCanvas {
    pub(crate) fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![[0.0; 3]; w * h],
        }
    }

    #[inline]
    fn add(&mut self, x: i32, y: i32, color: Rgb, amp: f32) {
        if x < 0 || y < 0 || x >= self.w as i32 || y >= self.h as i32 {
            return;
        }
        let i = y as usize * self.w + x as usize;
        let p = &mut self.px[i];
        p[0] = (p[0] + color.r as f32 / 255.0 * amp).min(ENERGY_CAP);
        p[1] = (p[1] + color.g as f32 / 255.0 * amp).min(ENERGY_CAP);
        p[2] = (p[2] + color.b as f32 / 255.0 * amp).min(ENERGY_CAP);
    }

    /// Gaussian-ish round dab, which also gives strokes their round caps
    /// and joins.
    fn stamp(&mut self, x: f32, y: f32, radius: f32, color: Rgb, amp: f32) {
        let r = radius.max(0.6);
        let reach = (r * 1.35).ceil() as i32;
        let ix = x.floor() as i32;
        let iy = y.floor() as i32;

        for oy in -reach..=reach {
            for ox in -reach..=reach {
                let fx = (ix + ox) as f32 + 0.5 - x;
                let fy = (iy + oy) as f32 + 0.5 - y;
                let d2 = fx * fx + fy * fy;
                let wgt = (-d2 * (1.8 / (r * r))).exp();
                self.add(ix + ox, iy + oy, color, amp * wgt);
            }
        }
    }

    fn stamp_line(&mut self, a: Point, b: Point, radius: f32, color: Rgb, amp: f32) {
        let len = a.distance(b).max(1e-6);
        let steps = (len / STROKE_STEP).ceil() as i32;
        for i in 0..=steps {
            let t = i as f32 / steps.max(1) as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            self.stamp(x, y, radius, color, amp);
        }
    }
}

impl Surface for BrailleCanvas {
    fn clear(&mut self) {
        self.px.fill([0.0; 3]);
    }

    fn stroke_polyline(&mut self, path: &[Point], style: StrokeStyle) {
        if path.len() < 2 || style.alpha <= 0.0 {
            return;
        }
        let core_r = style.width * 0.5;
        for pair in path.windows(2) {
            if let Some(glow) = style.glow {
                self.stamp_line(pair[0], pair[1], core_r + glow.radius, glow.color, glow.alpha * 0.3);
            }
            self.stamp_line(pair[0], pair[1], core_r, style.color, style.alpha);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let x0 = (x.floor() as i32).max(0);
        let y0 = (y.floor() as i32).max(0);
        let x1 = ((x + w).ceil() as i32).min(self.w as i32);
        let y1 = ((y + h).ceil() as i32).min(self.h as i32);
        for yy in y0..y1 {
            for xx in x0..x1 {
                self.add(xx, yy, color, alpha);
            }
        }
    }

    fn fill_radial(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x0 = ((cx - radius).floor() as i32).max(0);
        let y0 = ((cy - radius).floor() as i32).max(0);
        let x1 = ((cx + radius).ceil() as i32).min(self.w as i32);
        let y1 = ((cy + radius).ceil() as i32).min(self.h as i32);

        for yy in y0..y1 {
            for xx in x0..x1 {
                let dx = xx as f32 + 0.5 - cx;
                let dy = yy as f32 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 > r2 {
                    continue;
                }
                // Full color at the center, transparent at the rim.
                let t = 1.0 - (d2 / r2).sqrt();
                self.add(xx, yy, color, alpha * t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lum(c: &BrailleCanvas, x: usize, y: usize) -> f32 {
        let p = c.px[y * c.w + x];
        p[0].max(p[1]).max(p[2])
    }

    #[test]
    fn stroke_lights_pixels_along_the_path() {
        let mut c = BrailleCanvas::new(40, 40);
        let style = StrokeStyle {
            width: 3.0,
            color: Rgb::WHITE,
            alpha: 1.0,
            glow: None,
        };
        c.stroke_polyline(&[Point::new(5.0, 20.0), Point::new(35.0, 20.0)], style);

        assert!(lum(&c, 20, 20) > 0.1);
        assert!(lum(&c, 20, 5) < 0.01, "far off the stroke stays dark");
    }

    #[test]
    fn glow_reaches_beyond_the_core_width() {
        let mut c = BrailleCanvas::new(40, 40);
        let style = StrokeStyle {
            width: 2.0,
            color: Rgb::WHITE,
            alpha: 1.0,
            glow: Some(GlowStyle {
                color: Rgb::WHITE,
                alpha: 0.8,
                radius: 5.0,
            }),
        };
        c.stroke_polyline(&[Point::new(5.0, 20.0), Point::new(35.0, 20.0)], style);
        let with_glow = lum(&c, 20, 16);

        c.clear();
        c.stroke_polyline(
            &[Point::new(5.0, 20.0), Point::new(35.0, 20.0)],
            StrokeStyle { glow: None, ..style },
        );
        let without_glow = lum(&c, 20, 16);

        assert!(with_glow > without_glow);
    }

    #[test]
    fn deposits_are_clamped() {
        let mut c = BrailleCanvas::new(8, 8);
        for _ in 0..100 {
            c.fill_rect(0.0, 0.0, 8.0, 8.0, Rgb::WHITE, 1.0);
        }
        assert!(lum(&c, 4, 4) <= ENERGY_CAP);
    }

    #[test]
    fn full_surface_rect_lights_every_pixel() {
        let mut c = BrailleCanvas::new(16, 16);
        c.fill_rect(0.0, 0.0, 16.0, 16.0, Rgb::WHITE, 0.15);
        for y in 0..16 {
            for x in 0..16 {
                assert!(lum(&c, x, y) > 0.1);
            }
        }
    }

    #[test]
    fn radial_fill_fades_from_center_to_rim() {
        let mut c = BrailleCanvas::new(32, 32);
        c.fill_radial(16.0, 16.0, 10.0, Rgb::WHITE, 1.0);
        assert!(lum(&c, 16, 16) > lum(&c, 16, 24));
        assert!(lum(&c, 16, 30) < 0.01, "outside the radius stays dark");
    }

    #[test]
    fn out_of_bounds_strokes_are_harmless() {
        let mut c = BrailleCanvas::new(10, 10);
        let style = StrokeStyle {
            width: 4.0,
            color: Rgb::WHITE,
            alpha: 1.0,
            glow: None,
        };
        c.stroke_polyline(&[Point::new(-50.0, -50.0), Point::new(60.0, 60.0)], style);
        c.clear();
    }
}
