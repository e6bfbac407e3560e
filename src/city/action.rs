//! Recorded drawing primitives
//!
//! Every action owns screen-space geometry with its colours and jitter
//! already decided, so replaying an action list is deterministic.

use crate::display::{Paint, PixelBuffer, Rgb};
use crate::math3d::Vec2;

/// Stroke width of every city line
pub const STROKE_WIDTH: i32 = 2;

/// Straight stroke in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
}

impl Segment {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }

    fn draw(&self, buffer: &mut PixelBuffer, color: Rgb) {
        buffer.line_f(self.from.as_tuple(), self.to.as_tuple(), STROKE_WIDTH, color);
    }
}

/// Hatching pattern for flat rectangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hatch {
    None,
    Vertical,
    Horizontal,
    DiagUp,
    DiagDown,
}

impl Hatch {
    pub const LINED: [Hatch; 4] = [Hatch::Vertical, Hatch::Horizontal, Hatch::DiagUp, Hatch::DiagDown];
}

/// Interior colour and how it blends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub color: Rgb,
    pub paint: Paint,
}

impl Fill {
    pub const fn solid(color: Rgb) -> Self {
        Self {
            color,
            paint: Paint::Solid,
        }
    }

    pub const fn translucent(color: Rgb, alpha: u8) -> Self {
        Self {
            color,
            paint: Paint::Alpha(alpha),
        }
    }
}

/// Closed polygon with optional fill and pre-jittered outline strokes
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub vertices: Vec<Vec2>,
    pub fill: Option<Fill>,
    pub outline: Vec<Segment>,
    pub stroke: Rgb,
}

impl Shape {
    fn draw(&self, buffer: &mut PixelBuffer) {
        if let Some(fill) = self.fill {
            let points: Vec<(f32, f32)> = self.vertices.iter().map(Vec2::as_tuple).collect();
            buffer.fill_polygon(&points, fill.color, fill.paint);
        }
        for segment in &self.outline {
            segment.draw(buffer, self.stroke);
        }
    }
}

/// Projected cuboid
#[derive(Debug, Clone, PartialEq)]
pub struct BoxFaces {
    /// Silhouette hexagon: the two visible sides and the top
    pub hull: Shape,
    /// Front vertical edge
    pub edge: Segment,
    /// Bottom face, present only when the camera sees it
    pub underside: Option<Shape>,
}

/// One side panel of a cylinder
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub face: Shape,
    /// Shadow hatching over the panel
    pub shading: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawAction {
    Line {
        segment: Segment,
        color: Rgb,
    },
    Polygon(Shape),
    /// Axis-aligned screen rectangle
    FilledRect {
        min: Vec2,
        max: Vec2,
        fill: Fill,
    },
    Box(BoxFaces),
    Cylinder {
        base: Shape,
        facets: Vec<Facet>,
        top: Shape,
    },
    /// Hand-drawn looking ellipse: a filled first loop under a looping stroke
    Ellipse {
        fill_outline: Vec<Vec2>,
        stroke_path: Vec<Vec2>,
        fill: Option<Fill>,
        stroke: Option<Rgb>,
    },
}

impl DrawAction {
    /// Rasterize into `buffer`. Non-finite geometry is skipped by the rasterizer.
    pub fn draw(&self, buffer: &mut PixelBuffer) {
        match self {
            Self::Line { segment, color } => segment.draw(buffer, *color),
            Self::Polygon(shape) => shape.draw(buffer),
            Self::FilledRect { min, max, fill } => {
                let corners = [
                    (min.x, min.y),
                    (max.x, min.y),
                    (max.x, max.y),
                    (min.x, max.y),
                ];
                buffer.fill_polygon(&corners, fill.color, fill.paint);
            },
            Self::Box(faces) => {
                faces.hull.draw(buffer);
                faces.edge.draw(buffer, faces.hull.stroke);
                if let Some(under) = &faces.underside {
                    under.draw(buffer);
                }
            },
            Self::Cylinder { base, facets, top } => {
                base.draw(buffer);
                for facet in facets {
                    facet.face.draw(buffer);
                    for segment in &facet.shading {
                        segment.draw(buffer, facet.face.stroke);
                    }
                }
                top.draw(buffer);
            },
            Self::Ellipse {
                fill_outline,
                stroke_path,
                fill,
                stroke,
            } => {
                if let Some(fill) = fill {
                    let points: Vec<(f32, f32)> = fill_outline.iter().map(Vec2::as_tuple).collect();
                    buffer.fill_polygon(&points, fill.color, fill.paint);
                }
                if let Some(color) = stroke {
                    let points: Vec<(f32, f32)> = stroke_path.iter().map(Vec2::as_tuple).collect();
                    buffer.polyline(&points, STROKE_WIDTH, *color);
                }
            },
        }
    }

    /// Short name for logs and tests
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line { .. } => "line",
            Self::Polygon(_) => "polygon",
            Self::FilledRect { .. } => "rect",
            Self::Box(_) => "box",
            Self::Cylinder { .. } => "cylinder",
            Self::Ellipse { .. } => "ellipse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = (255, 0, 0);

    fn square(fill: Option<Fill>) -> Shape {
        let vertices = vec![
            Vec2::new(2.0, 2.0),
            Vec2::new(8.0, 2.0),
            Vec2::new(8.0, 8.0),
            Vec2::new(2.0, 8.0),
        ];
        Shape {
            vertices,
            fill,
            outline: Vec::new(),
            stroke: (0, 0, 0),
        }
    }

    #[test]
    fn test_line_draws_in_its_color() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        let action = DrawAction::Line {
            segment: Segment::new(Vec2::new(0.0, 5.0), Vec2::new(9.0, 5.0)),
            color: RED,
        };
        action.draw(&mut buffer);
        assert_eq!(buffer.get_pixel(4, 5), Some(RED));
    }

    #[test]
    fn test_polygon_without_fill_leaves_interior() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        DrawAction::Polygon(square(None)).draw(&mut buffer);
        assert_eq!(buffer.get_pixel(5, 5), Some((0, 0, 0)));
        DrawAction::Polygon(square(Some(Fill::solid(RED)))).draw(&mut buffer);
        assert_eq!(buffer.get_pixel(5, 5), Some(RED));
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        buffer.clear((255, 255, 255));
        DrawAction::FilledRect {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 10.0),
            fill: Fill::translucent((0, 0, 0), 150),
        }
        .draw(&mut buffer);
        let (r, _, _) = buffer.get_pixel(5, 5).unwrap();
        assert!(r > 90 && r < 120, "got {}", r);
    }

    #[test]
    fn test_non_finite_geometry_is_skipped() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        let before = buffer.clone();
        DrawAction::Line {
            segment: Segment::new(Vec2::new(f32::NAN, 0.0), Vec2::new(5.0, f32::INFINITY)),
            color: RED,
        }
        .draw(&mut buffer);
        let mut shape = square(Some(Fill::solid(RED)));
        shape.vertices[1] = Vec2::new(f32::NAN, 2.0);
        DrawAction::Polygon(shape).draw(&mut buffer);
        assert_eq!(buffer.as_bytes(), before.as_bytes());
    }

    #[test]
    fn test_ellipse_stroke_only() {
        let mut buffer = PixelBuffer::with_size(10, 10);
        let path = vec![Vec2::new(1.0, 1.0), Vec2::new(8.0, 1.0)];
        DrawAction::Ellipse {
            fill_outline: path.clone(),
            stroke_path: path,
            fill: None,
            stroke: Some(RED),
        }
        .draw(&mut buffer);
        assert_eq!(buffer.get_pixel(4, 1), Some(RED));
    }
}
