//! Geometric primitives that record [`DrawAction`]s
//!
//! Nothing here touches pixels. Each primitive projects its world points,
//! rolls its random jitter and colours, and appends the finished actions to
//! the drawer in painting order.

use std::f32::consts::{PI, TAU};

use super::action::{BoxFaces, DrawAction, Facet, Fill, Hatch, Segment, Shape};
use super::drawer::Drawer;
use super::palette::{Colors, Element, ResolvedPalette, BLACK};
use super::projection::Projector;
use crate::display::Rgb;
use crate::math3d::{Vec2, Vec3};
use crate::util::Rng;

/// Spacing between hatch and shadow lines, pixels
pub const HATCH_GAP: f32 = 6.0;

/// Upper bound on lines emitted by a single hatch or strip
const MAX_FILL_LINES: usize = 2048;

/// Offset of a cylinder's axis from its anchor point
const CYLINDER_INSET: f32 = 15.0;

/// Radial displacement applied to an ellipse outline, as a function of angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wobble {
    /// `2.5 * offset * sin(freq * angle)`, freq rolled per ellipse
    Sine,
    /// `offset * sin(angle * pi)^2`, the bumpy tree canopy
    Canopy,
}

/// `0, GAP, 2*GAP, ...` strictly below `limit`
fn gaps_below(limit: f32) -> impl Iterator<Item = f32> {
    (0..MAX_FILL_LINES)
        .map(|k| k as f32 * HATCH_GAP)
        .take_while(move |&i| i < limit)
}

/// `0, GAP, 2*GAP, ...` up to and including `limit`
fn gaps_through(limit: f32) -> impl Iterator<Item = f32> {
    (0..MAX_FILL_LINES)
        .map(|k| k as f32 * HATCH_GAP)
        .take_while(move |&i| i <= limit)
}

pub struct CityBuilder {
    projector: Projector,
    rng: Rng,
    colors: Colors,
    palette: ResolvedPalette,
    offset: f32,
    drawer: Drawer,
}

impl CityBuilder {
    /// Scene-wide colours (sky, ground, sun, strokes) are resolved once here
    pub fn new(projector: Projector, colors: Colors, offset: f32, seed: u64, step: usize) -> Self {
        let mut rng = Rng::new(seed);
        let palette = colors.resolve(&mut rng);
        Self {
            projector,
            rng,
            colors,
            palette,
            offset: offset.max(0.0),
            drawer: Drawer::new(step),
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    pub fn palette(&self) -> &ResolvedPalette {
        &self.palette
    }

    /// Fresh colour for one instance of `element`
    pub fn color(&mut self, element: Element) -> Rgb {
        self.colors.get(element, &mut self.rng)
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    /// Finish recording and rewind the queue
    pub fn into_drawer(mut self) -> Drawer {
        self.drawer.start();
        self.drawer
    }

    pub fn project(&self, pt: Vec3) -> Vec2 {
        self.projector.project(pt)
    }

    /// Hand-drawn offset in `[-offset, offset]`
    fn jitter(&mut self) -> f32 {
        if self.offset == 0.0 {
            return 0.0;
        }
        self.rng.range_f32(-self.offset, self.offset)
    }

    /// Segment whose start point is shaken by the jitter
    pub fn segment(&mut self, from: Vec2, to: Vec2) -> Segment {
        let shake = Vec2::new(self.jitter(), self.jitter());
        Segment::new(from + shake, to)
    }

    /// Closed polygon; `border` adds jittered outline strokes
    pub fn shape(&mut self, vertices: Vec<Vec2>, fill: Option<Fill>, border: bool) -> Shape {
        let mut outline = Vec::new();
        if border {
            if let Some(&last) = vertices.last() {
                let mut prev = last;
                for &v in &vertices {
                    outline.push(self.segment(prev, v));
                    prev = v;
                }
            }
        }
        Shape {
            vertices,
            fill,
            outline,
            stroke: self.palette.get(Element::Stroke),
        }
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn line(&mut self, from: Vec2, to: Vec2) {
        let segment = self.segment(from, to);
        let color = self.palette.get(Element::Stroke);
        self.drawer.push(DrawAction::Line { segment, color });
    }

    /// Line between two world points
    pub fn line3(&mut self, from: Vec3, to: Vec3) {
        let (a, b) = (self.project(from), self.project(to));
        self.line(a, b);
    }

    pub fn polygon(&mut self, vertices: Vec<Vec2>, fill: Option<Fill>, border: bool) {
        let shape = self.shape(vertices, fill, border);
        self.drawer.push(DrawAction::Polygon(shape));
    }

    /// Screen-space rectangle from `(sx, sy)` to `(ex, ey)`, then its hatching
    pub fn rect(&mut self, sx: f32, sy: f32, ex: f32, ey: f32, fill: Fill, hatch: Hatch) {
        self.drawer.push(DrawAction::FilledRect {
            min: Vec2::new(sx, sy),
            max: Vec2::new(ex, ey),
            fill,
        });
        match hatch {
            Hatch::None => {},
            Hatch::Vertical => self.hatch_vertical(sx, sy, ex, ey),
            Hatch::Horizontal => self.hatch_horizontal(sx, sy, ex, ey),
            Hatch::DiagUp => self.hatch_up(sx, sy, ex, ey),
            Hatch::DiagDown => self.hatch_down(sx, sy, ex, ey),
        }
    }

    /// Outlined quad through four world points
    pub fn rectangle(&mut self, corners: [Vec3; 4], fill: Option<Fill>) {
        let vertices = corners.iter().map(|&c| self.project(c)).collect();
        self.polygon(vertices, fill, true);
    }

    /// Cuboid spanned by the near-bottom corner `p1` and the far-top corner `p2`
    pub fn cuboid(&mut self, p1: Vec3, p2: Vec3, fill: Option<Fill>, underside: Option<Fill>) {
        let c1 = self.projector.xyz(p1.x, p2.y, p1.z);
        let c2 = self.projector.xyz(p1.x, p2.y, p2.z);
        let c3 = self.projector.xyz(p1.x, p1.y, p1.z);
        let c4 = self.projector.xyz(p1.x, p1.y, p2.z);
        let c5 = self.projector.xyz(p2.x, p1.y, p1.z);
        let c6 = self.projector.xyz(p2.x, p1.y, p2.z);
        let c7 = self.projector.xyz(p2.x, p2.y, p1.z);

        let hull = self.shape(vec![c1, c2, c4, c6, c5, c7], fill, true);
        let edge = self.segment(c4, c3);
        // The bottom face is only visible when the far-right corner drops below the far-left one
        let under = if c7.y > c1.y {
            Some(self.shape(vec![c1, c3, c5, c7], underside, true))
        } else {
            None
        };
        self.drawer.push(DrawAction::Box(BoxFaces {
            hull,
            edge,
            underside: under,
        }));

        self.strip(c1.y - c2.y, c3, c4, c5, c6);
    }

    /// Projected ellipse arc around the vertical axis through `center`
    pub fn arc(&self, center: Vec3, rx: f32, ry: f32, from: f32, to: f32, precision: usize) -> Vec<Vec2> {
        let precision = precision.max(1);
        let step = (to - from) / precision as f32;
        let point = |a: f32| {
            self.projector
                .xyz(center.x + a.cos() * rx, center.y - a.sin() * ry, center.z)
        };
        let mut vertices: Vec<Vec2> = (0..precision).map(|k| point(from + k as f32 * step)).collect();
        vertices.push(point(to));
        vertices
    }

    /// Faceted cylinder standing on `pt`
    ///
    /// Only facets facing the camera are emitted; the first `shadow` of them
    /// get shadow lines. The base is black.
    #[allow(clippy::too_many_arguments)]
    pub fn cylinder(
        &mut self,
        pt: Vec3,
        height: f32,
        radius: f32,
        precision: usize,
        fill: Option<Fill>,
        border: bool,
        shadow: usize,
    ) {
        let axis = Vec3::new(pt.x + CYLINDER_INSET, pt.y + CYLINDER_INSET, pt.z);
        let bottoms = self.arc(axis, radius, radius, 0.0, TAU, precision);
        let tops = self.arc(axis.with_z(pt.z + height), radius, radius, 0.0, TAU, precision);

        let (Some(&last_top), Some(&last_bottom)) = (tops.last(), bottoms.last()) else {
            return;
        };

        let base = self.shape(bottoms.clone(), Some(Fill::solid(BLACK)), border);
        let mut facets = Vec::new();
        let (mut prev_top, mut prev_bottom) = (last_top, last_bottom);
        for (&top, &bottom) in tops.iter().zip(&bottoms) {
            if bottom.x < prev_bottom.x {
                let face = self.shape(vec![prev_top, top, bottom, prev_bottom], fill, border);
                let shading = if facets.len() < shadow {
                    self.strip_segments(bottom.y - top.y, top, bottom, prev_top, prev_bottom)
                } else {
                    Vec::new()
                };
                facets.push(Facet { face, shading });
            }
            prev_top = top;
            prev_bottom = bottom;
        }
        let top = self.shape(tops, fill, border);

        self.drawer.push(DrawAction::Cylinder { base, facets, top });
    }

    /// Shadow lines across the quad `p1..p4`, one every [`HATCH_GAP`] along `dist`
    pub fn strip(&mut self, dist: f32, p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) {
        let color = self.palette.get(Element::Stroke);
        for segment in self.strip_segments(dist, p1, p2, p3, p4) {
            self.drawer.push(DrawAction::Line { segment, color });
        }
    }

    fn strip_segments(&mut self, dist: f32, p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Vec<Segment> {
        if !dist.is_finite() || dist <= 0.0 {
            return Vec::new();
        }
        let r1 = (p1.y - p2.y) / dist;
        let r2 = (p3.y - p4.y) / dist;
        gaps_below(dist)
            .map(|pp| self.segment(Vec2::new(p1.x, p2.y + pp * r1), Vec2::new(p3.x, p4.y + pp * r2)))
            .collect()
    }

    /// Sketchy ellipse: `loops` turns of a wobbling outline around `center`
    ///
    /// `loops == None` rolls 2, 3 or 4 turns. The first turn is also the fill outline.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        center: Vec2,
        rx: f32,
        ry: f32,
        fill: Option<Fill>,
        loops: Option<u32>,
        border: bool,
        wobble: Wobble,
    ) {
        if !center.is_finite() || !rx.is_finite() || !ry.is_finite() {
            return;
        }

        let freq = self.rng.range_f32(2.1, 2.5);
        let offset = self.offset;
        let noise = move |a: f32| match wobble {
            Wobble::Sine => 2.5 * offset * (freq * a).sin(),
            Wobble::Canopy => (a * PI).sin().powi(2) * offset,
        };
        let loops = match loops {
            Some(n) => n.max(1),
            None => *self.rng.choose(&[2, 3, 4]).unwrap_or(&2),
        };

        // One vertex every TAU / (min_radius / 2) radians
        let per_loop = (rx.min(ry).abs() * 0.5).clamp(8.0, 512.0).ceil() as usize;
        let step = TAU / per_loop as f32;
        let total = per_loop * loops as usize;
        let path: Vec<Vec2> = (0..=total)
            .map(|k| {
                let a = k as f32 * step;
                let v = noise(a);
                Vec2::new(center.x + a.cos() * rx - v, center.y + a.sin() * ry - v)
            })
            .collect();

        let stroke = border.then(|| self.palette.get(Element::Stroke));
        self.drawer.push(DrawAction::Ellipse {
            fill_outline: path[..=per_loop].to_vec(),
            stroke_path: path,
            fill,
            stroke,
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, fill: Option<Fill>, loops: Option<u32>) {
        self.ellipse(center, radius, radius, fill, loops, true, Wobble::Sine);
    }

    // ========================================================================
    // Hatching
    // ========================================================================

    fn hatch_up(&mut self, sx: f32, sy: f32, ex: f32, ey: f32) {
        let (dx, dy) = (ex - sx, ey - sy);
        let m = dx.min(dy);
        for i in gaps_below(m) {
            self.line(Vec2::new(sx, sy + i), Vec2::new(sx + i, sy));
        }
        if dx > dy {
            for i in gaps_below(dx - dy) {
                self.line(Vec2::new(sx + i, ey), Vec2::new(sx + dy + i, sy));
            }
        } else {
            for i in gaps_below(dy - dx) {
                self.line(Vec2::new(sx, sy + dx + i), Vec2::new(ex, sy + i));
            }
        }
        for d in gaps_through(m) {
            let i = m - d;
            self.line(Vec2::new(ex - i, ey), Vec2::new(ex, ey - i));
        }
    }

    fn hatch_down(&mut self, sx: f32, sy: f32, ex: f32, ey: f32) {
        let (dx, dy) = (ex - sx, ey - sy);
        let m = dx.min(dy);
        for i in gaps_below(m) {
            self.line(Vec2::new(sx + i, ey), Vec2::new(sx, ey - i));
        }
        if dx > dy {
            for i in gaps_below(dx - dy) {
                self.line(Vec2::new(sx + i, sy), Vec2::new(sx + dy + i, ey));
            }
        } else {
            for i in gaps_below(dy - dx) {
                self.line(Vec2::new(ex, ey - i), Vec2::new(sx, ey - dx - i));
            }
        }
        for d in gaps_through(m) {
            let i = m - d;
            self.line(Vec2::new(ex - i, sy), Vec2::new(ex, sy + i));
        }
    }

    fn hatch_horizontal(&mut self, sx: f32, sy: f32, ex: f32, ey: f32) {
        for i in gaps_below((ey - sy).abs()) {
            self.line(Vec2::new(sx, sy + i), Vec2::new(ex, sy + i));
        }
    }

    fn hatch_vertical(&mut self, sx: f32, sy: f32, ex: f32, ey: f32) {
        for i in gaps_below((ex - sx).abs()) {
            self.line(Vec2::new(sx + i, sy), Vec2::new(sx + i, ey));
        }
    }
}
