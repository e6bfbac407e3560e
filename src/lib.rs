//! Generative-art sketchbook: particle grids, chromatic trails and a
//! hand-drawn toy city, rendered into a software pixel buffer.

pub mod city;
pub mod config;
pub mod display;
pub mod ease;
pub mod error;
pub mod math3d;
pub mod particles;
pub mod sketches;
pub mod util;
