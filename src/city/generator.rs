//! Procedural toy city
//!
//! Sky, ground, then a row of lots along the depth axis and one along the
//! width axis, each holding a forest or a building. Lots are emitted back to
//! front so later actions paint over earlier ones.

use tracing::debug;

use super::action::{Fill, Hatch};
use super::builder::{CityBuilder, Wobble};
use super::drawer::Drawer;
use super::palette::{Colors, Element, BLACK, WHITE};
use super::projection::{Camera, Projector};
use super::CityParams;
use crate::math3d::{Vec2, Vec3};

/// Distance between neighbouring lots
const LOT_SPACING: f32 = 40.0;

/// Footprint of a building
const BUILDING_SIZE: f32 = 30.0;

/// Gap between window mullions
const MULLION_GAP: usize = 3;

/// Opacity of billboard panels
const BILLBOARD_ALPHA: u8 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lot {
    Forest,
    Building,
}

/// Record a whole city for a `width` x `height` canvas, ready to replay
pub fn generate(params: &CityParams, seed: u64, width: u32, height: u32) -> Drawer {
    let projector = Projector::new(Camera::default(), params.horizon, width as f32, height as f32);
    let colors = Colors::new(params.use_color);
    let mut b = CityBuilder::new(projector, colors, params.offset, seed, params.step);

    sky(&mut b);
    ground(&mut b);
    populate(&mut b);

    let drawer = b.into_drawer();
    debug!(actions = drawer.len(), seed, width, height, "city generated");
    drawer
}

/// Lot anchors in drawing order: depth row far to near, then width row far to near
pub fn lot_positions() -> Vec<Vec3> {
    let depth = (1..=9).rev().map(|z| Vec3::ground(0.0, z as f32 * LOT_SPACING));
    let width = (0..=5).rev().map(|x| Vec3::ground(x as f32 * LOT_SPACING, 0.0));
    depth.chain(width).collect()
}

fn sky(b: &mut CityBuilder) {
    let (w, h) = (b.projector().width(), b.projector().height());
    let limit = b.projector().horizon().sky_limit;

    let hatch = if b.rng().chance(0.5) {
        Hatch::None
    } else {
        b.rng().choose(&Hatch::LINED).copied().unwrap_or(Hatch::None)
    };
    let sky = b.palette().get(Element::Sky);
    b.rect(0.0, 0.0, w, h * limit, Fill::solid(sky), hatch);

    let sun = Vec2::new(w * b.rng().range_f32(0.1, 0.9), b.rng().range_f32(h * 0.1, h * 0.5));
    let color = b.palette().get(Element::Sun);
    b.circle(sun, h * 0.1, Some(Fill::solid(color)), None);
}

fn ground(b: &mut CityBuilder) {
    let (w, h) = (b.projector().width(), b.projector().height());
    let limit = b.projector().horizon().sky_limit;
    let o = b.offset();

    let soil = b.palette().get(Element::Ground);
    b.rect(-o, h * limit - o, w + o, h + o, Fill::solid(soil), Hatch::None);

    // Two passes give the roads a doubled, hand-drawn look
    for _ in 0..2 {
        b.line3(Vec3::ground(-10.0, 240.0), Vec3::ground(-10.0, -60.0));
        b.line3(Vec3::ground(-20.0, 240.0), Vec3::ground(-20.0, -60.0));
        b.line3(Vec3::ground(-40.0, -5.0), Vec3::ground(240.0, -5.0));
        b.line3(Vec3::ground(-40.0, -15.0), Vec3::ground(240.0, -15.0));
    }
}

fn populate(b: &mut CityBuilder) {
    for pt in lot_positions() {
        let lot = if b.rng().chance(0.5) { Lot::Forest } else { Lot::Building };
        match lot {
            Lot::Forest => forest(b, pt),
            Lot::Building => building(b, pt),
        }
    }
}

/// Random point within `spread / 2` of `pt` on the ground plane
fn near(b: &mut CityBuilder, pt: Vec3, spread: f32) -> Vec3 {
    let d = spread / 2.0;
    let dx = b.rng().range_f32(-d, d);
    let dy = b.rng().range_f32(-d, d);
    Vec3::new(pt.x + dx, pt.y + dy, pt.z)
}

/// Trunk plus a bumpy canopy, scaled down with distance
fn tree(b: &mut CityBuilder, pt: Vec3) {
    let trunk = b.rng().range_f32(4.0, 8.0);
    let base = b.project(pt);
    let top = b.project(pt.with_z(pt.z + trunk));
    let tall = base.y - top.y;
    let factor = b.projector().factor(pt).y.abs().clamp(0.0, 0.7);
    let rx = factor * b.rng().range_f32(tall * 0.7, tall * 1.2);
    let ry = factor * b.rng().range_f32(tall * 0.7, tall * 1.2);

    b.line(base, top);
    let leaves = b.color(Element::Tree);
    let center = Vec2::new(top.x + b.rng().range_f32(-1.0, 1.0), top.y);
    b.ellipse(center, rx, ry, Some(Fill::solid(leaves)), Some(2), true, Wobble::Canopy);
}

fn forest(b: &mut CityBuilder, pt: Vec3) {
    let count = b.rng().range_i32(10, 14);
    for _ in 0..count {
        let spot = near(b, pt, 30.0);
        tree(b, spot);
    }
}

/// Two vertical panels standing at `pt`
fn billboard(b: &mut CityBuilder, pt: Vec3, fill: Fill) {
    let left = Vec3::new(pt.x, pt.y + 5.0, pt.z);
    let left_end = Vec3::new(pt.x + 15.0, pt.y + 20.0, 10.0);
    b.rectangle(
        [
            Vec3::new(left.x, left_end.y, left.z),
            Vec3::new(left.x, left_end.y, left_end.z),
            Vec3::new(left.x, left.y, left_end.z),
            Vec3::new(left.x, left.y, left.z),
        ],
        Some(fill),
    );

    let right = Vec3::new(pt.x + 10.0, pt.y, pt.z);
    let right_end = Vec3::new(pt.x + 20.0, pt.y - 5.0, 10.0);
    b.rectangle(
        [
            Vec3::new(right.x, right_end.y, right.z),
            Vec3::new(right.x, right_end.y, right_end.z),
            Vec3::new(right.x, right.y, right_end.z),
            Vec3::new(right.x, right.y, right.z),
        ],
        Some(fill),
    );
}

/// Glass tower on a stone base, with roof pillars and an optional billboard
fn building(b: &mut CityBuilder, pt: Vec3) {
    let (x, y) = (pt.x, pt.y);
    let s = BUILDING_SIZE;
    let h = b.rng().range_f32(50.0, 100.0).floor();
    let white = Some(Fill::solid(WHITE));

    let tall = h + b.rng().range_f32(20.0, 30.0);
    b.cuboid(Vec3::new(x + 20.0, y + 10.0, h), Vec3::new(x + 21.0, y + 11.0, tall), white, None);
    let tall = h + b.rng().range_f32(20.0, 30.0);
    b.cuboid(Vec3::new(x + 10.0, y + 10.0, h), Vec3::new(x + 11.0, y + 11.0, tall), white, None);

    b.rectangle(
        [
            Vec3::new(x, y, h),
            Vec3::new(x + s, y, h),
            Vec3::new(x + s, y + s, h),
            Vec3::new(x, y + s, h),
        ],
        white,
    );

    let glass = b.color(Element::Window);
    b.cuboid(
        Vec3::new(x, y, 20.0),
        Vec3::new(x + s, y + s, h - 4.0),
        Some(Fill::solid(glass)),
        Some(Fill::solid(BLACK)),
    );
    for fi in (MULLION_GAP..BUILDING_SIZE as usize).step_by(MULLION_GAP).rev() {
        let fi = fi as f32;
        b.line3(Vec3::new(x, y + fi, 20.0), Vec3::new(x, y + fi, h - 4.0));
        b.line3(Vec3::new(x + fi, y, 20.0), Vec3::new(x + fi, y, h - 4.0));
    }

    let stone = b.color(Element::Structure);
    b.cuboid(pt, Vec3::new(x + s, y + s, 19.0), Some(Fill::solid(stone)), None);

    if b.rng().chance(0.5) {
        billboard(b, pt, Fill::translucent(BLACK, BILLBOARD_ALPHA));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::action::DrawAction;

    fn params(use_color: bool) -> CityParams {
        CityParams {
            use_color,
            ..CityParams::default()
        }
    }

    #[test]
    fn test_same_seed_same_city() {
        let a = generate(&params(true), 7, 1000, 800);
        let b = generate(&params(true), 7, 1000, 800);
        assert!(a.len() > 100);
        assert_eq!(a.actions(), b.actions());
    }

    #[test]
    fn test_different_seed_different_city() {
        let a = generate(&params(true), 7, 1000, 800);
        let b = generate(&params(true), 8, 1000, 800);
        assert_ne!(a.actions(), b.actions());
    }

    #[test]
    fn test_lots_are_back_to_front() {
        let lots = lot_positions();
        assert_eq!(lots.len(), 15);
        assert_eq!(lots[0], Vec3::ground(0.0, 360.0));
        assert_eq!(lots[8], Vec3::ground(0.0, 40.0));
        assert_eq!(lots[9], Vec3::ground(200.0, 0.0));
        assert_eq!(lots[14], Vec3::ground(0.0, 0.0));
        for pair in lots[..9].windows(2) {
            assert!(pair[0].y > pair[1].y);
        }
        for pair in lots[9..].windows(2) {
            assert!(pair[0].x > pair[1].x);
        }
    }

    #[test]
    fn test_scene_starts_with_sky() {
        let drawer = generate(&params(true), 3, 1000, 800);
        match &drawer.actions()[0] {
            DrawAction::FilledRect { min, max, fill } => {
                assert_eq!(*min, Vec2::zero());
                assert_eq!(max.x, 1000.0);
                assert!((max.y - 720.0).abs() < 1e-3);
                assert_eq!(fill.color, crate::util::hex(0x327be9));
            },
            other => panic!("expected the sky first, got {:?}", other),
        }
    }

    #[test]
    fn test_monochrome_city_is_black_on_white() {
        let drawer = generate(&params(false), 11, 640, 480);
        for action in drawer.actions() {
            match action {
                DrawAction::Line { color, .. } => assert_eq!(*color, BLACK),
                DrawAction::FilledRect { fill, .. } => assert_eq!(fill.color, WHITE),
                DrawAction::Polygon(shape) => assert_eq!(shape.stroke, BLACK),
                DrawAction::Box(faces) => {
                    assert_eq!(faces.hull.stroke, BLACK);
                    if let Some(fill) = faces.hull.fill {
                        assert_eq!(fill.color, WHITE);
                    }
                },
                _ => {},
            }
        }
    }

    #[test]
    fn test_generated_queue_is_ready_to_play() {
        let mut drawer = generate(&CityParams::default(), 1, 200, 200);
        let mut buffer = crate::display::PixelBuffer::with_size(200, 200);
        let mut calls = 0;
        while drawer.call(&mut buffer) == crate::city::Replay::Continue {
            calls += 1;
        }
        assert_eq!(calls + 1, drawer.len().div_ceil(drawer.step()));
    }
}
