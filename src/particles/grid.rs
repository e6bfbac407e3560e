//! N x N grid of independent box-relative drawables, centred on the canvas

use tracing::warn;

use crate::display::PixelBuffer;

/// Something that can draw itself into a centred square region
///
/// `size` is the half-extent of the square: the drawable owns
/// `[cx - size, cx + size] x [cy - size, cy + size]`.
pub trait BoxDrawable {
    fn render_in_box(&self, buffer: &mut PixelBuffer, cx: f32, cy: f32, size: f32);
}

/// Factory the grid calls on construction and on every reset
pub trait GridSource {
    type Drawable: BoxDrawable;

    /// Build exactly `count` drawables
    fn add_drawables(&mut self, count: usize) -> Vec<Self::Drawable>;
}

/// Placement of one grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Flattened index `col * n + row`
    pub index: usize,
    pub col: usize,
    pub row: usize,
    pub cx: f32,
    pub cy: f32,
    /// Half-extent handed to `render_in_box`
    pub size: f32,
}

pub struct BoxGrid<S: GridSource> {
    source: S,
    drawables: Vec<S::Drawable>,
    n: usize,
    size_factor: f32,
    margin: f32,
}

impl<S: GridSource> BoxGrid<S> {
    pub fn new(source: S, n: usize, size_factor: f32) -> Self {
        let mut grid = Self {
            source,
            drawables: Vec::new(),
            n,
            size_factor,
            margin: 0.0,
        };
        grid.reset(n, size_factor);
        grid
    }

    /// Pixels kept free around the grid (subtracted from the shorter side)
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Rebuild all drawables through the factory
    pub fn reset(&mut self, n: usize, size_factor: f32) {
        self.n = n;
        self.size_factor = size_factor;
        let expected = n * n;
        self.drawables = self.source.add_drawables(expected);
        if self.drawables.len() != expected {
            warn!(
                expected,
                got = self.drawables.len(),
                "grid factory returned the wrong number of drawables"
            );
        }
    }

    /// Change the size factor without rebuilding the drawables
    pub fn set_size_factor(&mut self, size_factor: f32) {
        self.size_factor = size_factor;
    }

    /// Layout for a `width` x `height` canvas
    pub fn cells(&self, width: u32, height: u32) -> Vec<GridCell> {
        let n = self.n;
        if n == 0 {
            return Vec::new();
        }

        let cell = ((width.min(height) as f32) - self.margin) / n as f32;
        let half = (n / 2) as f32;
        let even_fix = if n % 2 == 0 { cell / 2.0 } else { 0.0 };
        let mid_x = width as f32 / 2.0;
        let mid_y = height as f32 / 2.0;
        let size = cell / 2.0 * self.size_factor;

        let mut cells = Vec::with_capacity(n * n);
        for col in 0..n {
            for row in 0..n {
                cells.push(GridCell {
                    index: col * n + row,
                    col,
                    row,
                    cx: mid_x + (col as f32 - half) * cell + even_fix,
                    cy: mid_y + (row as f32 - half) * cell + even_fix,
                    size,
                });
            }
        }
        cells
    }

    /// Draw every cell's drawable into `buffer`
    pub fn render(&self, buffer: &mut PixelBuffer) {
        for cell in self.cells(buffer.width(), buffer.height()) {
            if let Some(d) = self.drawables.get(cell.index) {
                d.render_in_box(buffer, cell.cx, cell.cy, cell.size);
            }
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn size_factor(&self) -> f32 {
        self.size_factor
    }

    pub fn drawables(&self) -> &[S::Drawable] {
        &self.drawables
    }

    pub fn drawables_mut(&mut self) -> &mut [S::Drawable] {
        &mut self.drawables
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
