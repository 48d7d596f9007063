use crate::canvas::BrailleCanvas;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

// Minimum channel energy for a braille dot to light up.
const DOT_THRESHOLD: f32 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// True when the terminal changed size; buffers are rebuilt and the
    /// next present repaints everything.
    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        execute!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Diff-based present: only changed cells get re-queued.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate, SetBackgroundColor(Color::Black))?;

        let mut last_fg = None;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2x4 subpixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: usize, dy: usize) -> u8 {
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub(crate) fn canvas_to_cells(canvas: &BrailleCanvas, out: &mut CellBuffer) {
    let cols = out.w as usize;
    let rows = out.h as usize;

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum = [0.0f32; 3];
            let mut lit = 0u32;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[y * canvas.w + x];
                    if p[0].max(p[1]).max(p[2]) > DOT_THRESHOLD {
                        mask |= braille_bit(dx, dy);
                        sum[0] += p[0];
                        sum[1] += p[1];
                        sum[2] += p[2];
                        lit += 1;
                    }
                }
            }

            if mask == 0 {
                out.set(cx as u16, cy as u16, Cell::default());
                continue;
            }

            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            let to_byte = |v: f32| ((v / lit as f32).clamp(0.0, 1.0) * 255.0) as u8;
            let fg = Color::Rgb {
                r: to_byte(sum[0]),
                g: to_byte(sum[1]),
                b: to_byte(sum[2]),
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg });
        }
    }
}

/* -----------------------------
   Text overlays
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg });
    }
}

pub(crate) fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let bw = 52.min(buf.w.saturating_sub(4));
    let bh = (body.lines().count() as u16 + 4).min(buf.h.saturating_sub(2));
    if bw < 8 || bh < 4 {
        return;
    }
    let x0 = (buf.w - bw) / 2;
    let y0 = (buf.h - bh) / 2;
    let fg = Color::Grey;

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            let ch = if y == y0 || y == y0 + bh - 1 {
                '─'
            } else if x == x0 || x == x0 + bw - 1 {
                '│'
            } else {
                ' '
            };
            buf.set(x, y, Cell { ch, fg });
        }
    }
    buf.set(x0, y0, Cell { ch: '┌', fg });
    buf.set(x0 + bw - 1, y0, Cell { ch: '┐', fg });
    buf.set(x0, y0 + bh - 1, Cell { ch: '└', fg });
    buf.set(x0 + bw - 1, y0 + bh - 1, Cell { ch: '┘', fg });

    draw_text(buf, x0 + 2, y0 + 1, title, Color::White);
    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        draw_text(buf, x0 + 2, yy, line, fg);
        yy += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Rgb, Surface};

    #[test]
    fn dim_canvas_produces_blank_cells() {
        let canvas = BrailleCanvas::new(8, 8);
        let mut buf = CellBuffer::new(4, 2);
        canvas_to_cells(&canvas, &mut buf);
        assert!(buf.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn bright_subpixels_set_braille_dots() {
        let mut canvas = BrailleCanvas::new(8, 8);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Rgb::WHITE, 1.0);

        let mut buf = CellBuffer::new(4, 2);
        canvas_to_cells(&canvas, &mut buf);

        let cell = buf.cells[0];
        assert_eq!(cell.ch, char::from_u32(0x2800 + 0x01).unwrap());
        assert!(matches!(cell.fg, Color::Rgb { .. }));
    }

    #[test]
    fn text_is_clipped_at_the_buffer_edge() {
        let mut buf = CellBuffer::new(6, 1);
        draw_text(&mut buf, 3, 0, "abcdef", Color::White);
        assert_eq!(buf.cells[3].ch, 'a');
        assert_eq!(buf.cells[5].ch, 'c');
    }
}
