use super::Rgb;

// ============================================================================
// Paint Mode
// ============================================================================

/// How a primitive combines with what is already in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Overwrite
    Solid,
    /// Source-over blending with the given alpha
    Alpha(u8),
    /// dst += src * alpha / 255, saturating (light mixing)
    Additive(u8),
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

#[inline]
fn scale_channel(src: u8, alpha: u16) -> u8 {
    ((src as u16 * alpha + 127) / 255) as u8
}

/// Combine one ABGR pixel (RGBA8888 little-endian byte order) with `color`
#[inline]
fn paint_bytes(dest: &mut [u8], (r, g, b): Rgb, paint: Paint) {
    match paint {
        Paint::Solid => {
            dest[0] = 255;
            dest[1] = b;
            dest[2] = g;
            dest[3] = r;
        },
        Paint::Alpha(a) => {
            let alpha = a as u16;
            dest[0] = 255;
            dest[1] = blend_channel(b, dest[1], alpha);
            dest[2] = blend_channel(g, dest[2], alpha);
            dest[3] = blend_channel(r, dest[3], alpha);
        },
        Paint::Additive(a) => {
            let alpha = a as u16;
            dest[1] = dest[1].saturating_add(scale_channel(b, alpha));
            dest[2] = dest[2].saturating_add(scale_channel(g, alpha));
            dest[3] = dest[3].saturating_add(scale_channel(r, alpha));
        },
    }
}

/// Clamp a float coordinate into a range that survives integer line math
#[inline]
fn to_coord(v: f32) -> i32 {
    v.clamp(-1_000_000.0, 1_000_000.0) as i32
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering
/// This is the canvas every sketch draws into
#[derive(Clone)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer (opaque black)
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        };
        buffer.clear((0, 0, 0));
        buffer
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    pub fn clear(&mut self, (r, g, b): Rgb) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[255, b, g, r]);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        self.paint_pixel(x, y, color, Paint::Solid);
    }

    /// Combine a single pixel (bounds checked)
    #[inline]
    pub fn paint_pixel(&mut self, x: i32, y: i32, color: Rgb, paint: Paint) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            paint_bytes(&mut self.pixels[idx..idx + 4], color, paint);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Horizontal span, clipped to the buffer
    pub fn span(&mut self, x1: i32, x2: i32, y: i32, color: Rgb, paint: Paint) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        // Compute starting index once, then increment by 4 per pixel
        let mut idx = self.pixel_index(start as u32, y as u32);
        for _ in start..=end {
            paint_bytes(&mut self.pixels[idx..idx + 4], color, paint);
            idx += 4;
        }
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb, paint: Paint) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1 } else { -1 };
        let sy = if cy0 < cy1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            self.paint_pixel(x, y, color, paint);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Line between float endpoints. Non-finite endpoints draw nothing.
    pub fn line_f(&mut self, from: (f32, f32), to: (f32, f32), thickness: i32, color: Rgb) {
        if !(from.0.is_finite() && from.1.is_finite() && to.0.is_finite() && to.1.is_finite()) {
            return;
        }
        self.line_thick(
            to_coord(from.0),
            to_coord(from.1),
            to_coord(to.0),
            to_coord(to.1),
            thickness,
            color,
        );
    }

    /// Cohen-Sutherland line clipping algorithm
    /// Returns the clipped endpoints, or None when the line misses the buffer
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        if self.width == 0 || self.height == 0 {
            return None;
        }

        // i64 keeps dx * dy products from overflowing on far off-screen points
        let w = self.width as i64;
        let h = self.height as i64;
        let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);

        let outcode = |x: i64, y: i64| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0 as i32, y0 as i32, x1 as i32, y1 as i32));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let dy = y1 - y0;
            let dx = x1 - x0;

            let (x, y) = if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                (x0 + dx * (h - 1 - y0) / dy, h - 1)
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                (x0 + dx * (0 - y0) / dy, 0)
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                (w - 1, y0 + dy * (w - 1 - x0) / dx)
            } else {
                if dx == 0 {
                    return None;
                }
                (0, y0 + dy * (0 - x0) / dx)
            };

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Draw a line with variable thickness as parallel 1px lines
    pub fn line_thick(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: i32, color: Rgb) {
        if thickness <= 1 {
            self.line(x0, y0, x1, y1, color, Paint::Solid);
            return;
        }

        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let len = (dx * dx + dy * dy).sqrt();

        if len < 0.001 {
            self.fill_circle(x0, y0, thickness / 2, color, Paint::Solid);
            return;
        }

        // Perpendicular unit vector
        let px = -dy / len;
        let py = dx / len;

        let half = (thickness - 1) as f32 / 2.0;
        for i in 0..thickness {
            let offset = (i as f32) - half;
            let ox = (px * offset).floor() as i32;
            let oy = (py * offset).floor() as i32;
            self.line(x0 + ox, y0 + oy, x1 + ox, y1 + oy, color, Paint::Solid);
        }
    }

    /// Open polyline through `points`
    pub fn polyline(&mut self, points: &[(f32, f32)], thickness: i32, color: Rgb) {
        for pair in points.windows(2) {
            self.line_f(pair[0], pair[1], thickness, color);
        }
    }

    /// Draw a filled circle using horizontal spans
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb, paint: Paint) {
        if radius <= 0 {
            if radius == 0 {
                self.paint_pixel(cx, cy, color, paint);
            }
            return;
        }

        // Midpoint circle algorithm with span filling
        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            // Spans for 4 quadrants, avoiding duplicates (matters for blended paint)
            self.span(cx - x, cx + x, cy + y, color, paint);
            if y != 0 {
                self.span(cx - x, cx + x, cy - y, color, paint);
            }
            if x != y && err >= 0 {
                self.span(cx - y, cx + y, cy + x, color, paint);
                self.span(cx - y, cx + y, cy - x, color, paint);
            }

            if err < 0 {
                y += 1;
                err += 2 * y + 1;
            } else {
                y += 1;
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Fill a polygon using the even-odd scanline rule
    ///
    /// Vertices with non-finite coordinates make the whole polygon a no-op.
    pub fn fill_polygon(&mut self, vertices: &[(f32, f32)], color: Rgb, paint: Paint) {
        if vertices.len() < 3 || vertices.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return;
        }

        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for (_, y) in vertices {
            min_y = min_y.min(*y);
            max_y = max_y.max(*y);
        }

        let min_y = (min_y.floor() as i32).max(0);
        let max_y = (max_y.ceil() as i32).min(self.height as i32 - 1);

        // Reused per scanline
        let mut intersections = Vec::with_capacity(vertices.len());
        let n = vertices.len();

        for y in min_y..=max_y {
            intersections.clear();
            let yf = y as f32 + 0.5;

            for i in 0..n {
                let (x1, y1) = vertices[i];
                let (x2, y2) = vertices[(i + 1) % n];

                if (y1 <= yf && y2 > yf) || (y2 <= yf && y1 > yf) {
                    let x = x1 + (yf - y1) / (y2 - y1) * (x2 - x1);
                    intersections.push(to_coord(x));
                }
            }

            intersections.sort_unstable();
            for pair in intersections.chunks_exact(2) {
                self.span(pair[0], pair[1], y, color, paint);
            }
        }
    }

    // ========================================================================
    // Buffer Operations
    // ========================================================================

    /// Fade the entire buffer toward black
    /// factor: 0.0 = black, 1.0 = unchanged
    pub fn fade(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        let factor_u16 = (factor * 256.0) as u16;

        for chunk in self.pixels.chunks_exact_mut(4) {
            // Skip alpha (chunk[0])
            chunk[1] = ((chunk[1] as u16 * factor_u16) >> 8) as u8;
            chunk[2] = ((chunk[2] as u16 * factor_u16) >> 8) as u8;
            chunk[3] = ((chunk[3] as u16 * factor_u16) >> 8) as u8;
        }
    }

    /// Copy contents from another buffer (no-op unless sizes match)
    pub fn copy_from(&mut self, src: &PixelBuffer) {
        if self.width == src.width && self.height == src.height {
            self.pixels.copy_from_slice(&src.pixels);
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}
