//! Semantic colour palette for the city

use crate::display::Rgb;
use crate::util::{hex, Rng};

pub const BLACK: Rgb = (0, 0, 0);
pub const WHITE: Rgb = (255, 255, 255);

/// Things in the city that get a colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Stroke,
    Sun,
    Sky,
    Ground,
    Tree,
    Window,
    Structure,
    StructureShadow,
}

impl Element {
    pub const ALL: [Element; 8] = [
        Element::Stroke,
        Element::Sun,
        Element::Sky,
        Element::Ground,
        Element::Tree,
        Element::Window,
        Element::Structure,
        Element::StructureShadow,
    ];

    fn candidates(self) -> &'static [Rgb] {
        const STROKE: [Rgb; 1] = [hex(0x000000)];
        const SUN: [Rgb; 1] = [hex(0xded40d)];
        const SKY: [Rgb; 1] = [hex(0x327be9)];
        const GROUND: [Rgb; 1] = [hex(0x282318)];
        const TREE: [Rgb; 3] = [hex(0x3d720f), hex(0x3d720f), hex(0x74ba34)];
        const WINDOW: [Rgb; 3] = [hex(0x84ace2), hex(0x57e6fa), hex(0x7fb7cb)];
        const STRUCTURE: [Rgb; 3] = [hex(0x67605e), hex(0x6b7c7c), hex(0x99b7b6)];
        const SHADOW: [Rgb; 3] = [hex(0x473e3c), hex(0x1e2929), hex(0x2b2b21)];

        match self {
            Self::Stroke => &STROKE,
            Self::Sun => &SUN,
            Self::Sky => &SKY,
            Self::Ground => &GROUND,
            Self::Tree => &TREE,
            Self::Window => &WINDOW,
            Self::Structure => &STRUCTURE,
            Self::StructureShadow => &SHADOW,
        }
    }
}

/// Element -> colour mapping, either monochrome or randomly coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    use_color: bool,
}

impl Colors {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn set_use_color(&mut self, value: bool) {
        self.use_color = value;
    }

    /// Colour for `element`
    ///
    /// Without colour, strokes are black and everything else is white. With
    /// colour, every call draws a fresh candidate; use [`Colors::resolve`]
    /// when the same element must keep one colour.
    pub fn get(&self, element: Element, rng: &mut Rng) -> Rgb {
        if !self.use_color {
            return if element == Element::Stroke { BLACK } else { WHITE };
        }
        rng.choose(element.candidates()).copied().unwrap_or(BLACK)
    }

    /// Sample one colour per element
    pub fn resolve(&self, rng: &mut Rng) -> ResolvedPalette {
        let mut colors = [BLACK; 8];
        for (slot, element) in colors.iter_mut().zip(Element::ALL) {
            *slot = self.get(element, rng);
        }
        ResolvedPalette { colors }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self::new(true)
    }
}

/// One fixed colour per element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPalette {
    colors: [Rgb; 8],
}

impl ResolvedPalette {
    pub fn get(&self, element: Element) -> Rgb {
        self.colors[element as usize]
    }
}
