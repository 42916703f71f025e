use crate::grid::Grid;
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};
use std::io::{self, Write};

const FULL: char = '█';
const UPPER: char = '▀';
const LOWER: char = '▄';

/// Named foreground colors accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum CellColor {
    #[default]
    White,
    Black,
    Cyan,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
}

impl CellColor {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        let c = match name.trim().to_ascii_lowercase().as_str() {
            "white" => CellColor::White,
            "black" => CellColor::Black,
            "cyan" => CellColor::Cyan,
            "red" => CellColor::Red,
            "green" => CellColor::Green,
            "yellow" => CellColor::Yellow,
            "blue" => CellColor::Blue,
            "magenta" => CellColor::Magenta,
            _ => return None,
        };
        Some(c)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            CellColor::White => "white",
            CellColor::Black => "black",
            CellColor::Cyan => "cyan",
            CellColor::Red => "red",
            CellColor::Green => "green",
            CellColor::Yellow => "yellow",
            CellColor::Blue => "blue",
            CellColor::Magenta => "magenta",
        }
    }

    // Bright variants (SGR 90..97); "black" is the bright black, i.e. dark grey.
    pub(crate) fn fg(self) -> Color {
        match self {
            CellColor::White => Color::White,
            CellColor::Black => Color::DarkGrey,
            CellColor::Cyan => Color::Cyan,
            CellColor::Red => Color::Red,
            CellColor::Green => Color::Green,
            CellColor::Yellow => Color::Yellow,
            CellColor::Blue => Color::Blue,
            CellColor::Magenta => Color::Magenta,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DisplayMode {
    /// One grid cell per terminal cell, full repaint every tick.
    Full,
    /// Two grid rows per terminal row, differential repaint.
    HalfBlock,
}

impl DisplayMode {
    /// Grid (rows, cols) for a terminal of `term_rows` x `term_cols`.
    pub(crate) fn grid_dims(self, term_rows: u16, term_cols: u16) -> (usize, usize) {
        let rows = term_rows.max(1) as usize;
        let cols = term_cols.max(1) as usize;
        match self {
            DisplayMode::Full => (rows, cols),
            DisplayMode::HalfBlock => (rows * 2, cols),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Glyph {
    pub(crate) ch: char,
    pub(crate) fg: Option<Color>,
}

impl Glyph {
    const BLANK: Glyph = Glyph { ch: ' ', fg: None };
}

/// Terminal-sized image of a grid: one glyph per screen cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) cells: Vec<Glyph>,
}

impl Frame {
    fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Glyph::BLANK; cols as usize * rows as usize],
        }
    }

    pub(crate) fn get(&self, x: u16, y: u16) -> Glyph {
        self.cells[y as usize * self.cols as usize + x as usize]
    }

    fn set(&mut self, x: u16, y: u16, g: Glyph) {
        let i = y as usize * self.cols as usize + x as usize;
        self.cells[i] = g;
    }
}

fn clamp_u16(n: usize) -> u16 {
    n.min(u16::MAX as usize) as u16
}

pub(crate) struct Renderer {
    mode: DisplayMode,
    color: CellColor,
}

impl Renderer {
    pub(crate) fn new(mode: DisplayMode, color: CellColor) -> Self {
        Self { mode, color }
    }

    pub(crate) fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub(crate) fn frame_for(&self, grid: &Grid) -> Frame {
        let alive = Some(self.color.fg());
        let cols = clamp_u16(grid.cols());
        match self.mode {
            DisplayMode::Full => {
                let mut f = Frame::new(cols, clamp_u16(grid.rows()));
                for y in 0..f.rows {
                    for x in 0..f.cols {
                        if grid.get(y as usize, x as usize) {
                            f.set(x, y, Glyph { ch: FULL, fg: alive });
                        }
                    }
                }
                f
            }
            DisplayMode::HalfBlock => {
                let mut f = Frame::new(cols, clamp_u16(grid.rows().div_ceil(2)));
                for y in 0..f.rows {
                    let top_row = y as usize * 2;
                    for x in 0..f.cols {
                        let col = x as usize;
                        // an unpaired trailing row reads as dead below
                        let top = grid.get(top_row, col);
                        let bottom = grid.get(top_row + 1, col);
                        let ch = match (top, bottom) {
                            (true, true) => FULL,
                            (true, false) => UPPER,
                            (false, true) => LOWER,
                            (false, false) => continue,
                        };
                        f.set(x, y, Glyph { ch, fg: alive });
                    }
                }
                f
            }
        }
    }

    /// Draw `grid`. In half-block mode only glyphs that differ from
    /// `previous` are written; full mode always repaints.
    ///
    /// Returns the number of glyphs written.
    pub(crate) fn draw<W: Write>(
        &self,
        out: &mut W,
        grid: &Grid,
        previous: Option<&Grid>,
    ) -> io::Result<usize> {
        let frame = self.frame_for(grid);
        match self.mode {
            DisplayMode::Full => present(out, &frame, None),
            DisplayMode::HalfBlock => {
                let prev = previous.map(|p| self.frame_for(p));
                present(out, &frame, prev.as_ref())
            }
        }
    }
}

/// Write `frame`, diffing against `previous` when it has the same shape.
///
/// Without a usable baseline the screen is cleared and every glyph is
/// written. A frame identical to its baseline writes nothing at all.
pub(crate) fn present<W: Write>(
    out: &mut W,
    frame: &Frame,
    previous: Option<&Frame>,
) -> io::Result<usize> {
    let previous = previous.filter(|p| p.cols == frame.cols && p.rows == frame.rows);

    let Some(prev) = previous else {
        queue!(out, BeginSynchronizedUpdate, Clear(ClearType::All))?;
        let mut current_fg: Option<Color> = None;
        for y in 0..frame.rows {
            queue!(out, cursor::MoveTo(0, y))?;
            for x in 0..frame.cols {
                put(out, frame.get(x, y), &mut current_fg)?;
            }
        }
        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        return Ok(frame.cells.len());
    };

    let changed = frame
        .cells
        .iter()
        .zip(&prev.cells)
        .filter(|(a, b)| a != b)
        .count();
    if changed == 0 {
        return Ok(0);
    }

    queue!(out, BeginSynchronizedUpdate)?;
    let mut current_fg: Option<Color> = None;
    let mut cursor_at: Option<(u16, u16)> = None;
    for y in 0..frame.rows {
        for x in 0..frame.cols {
            let g = frame.get(x, y);
            if g == prev.get(x, y) {
                continue;
            }
            if cursor_at != Some((x, y)) {
                queue!(out, cursor::MoveTo(x, y))?;
            }
            put(out, g, &mut current_fg)?;
            cursor_at = Some((x + 1, y));
        }
    }
    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()?;
    Ok(changed)
}

fn put<W: Write>(out: &mut W, g: Glyph, current_fg: &mut Option<Color>) -> io::Result<()> {
    if let Some(fg) = g.fg {
        if *current_fg != Some(fg) {
            queue!(out, SetForegroundColor(fg))?;
            *current_fg = Some(fg);
        }
    }
    queue!(out, Print(g.ch))
}
