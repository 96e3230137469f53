//! Color values as supplied by the UI.

use peniko::Color;
use peniko::color::{Srgb, parse_color};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA8 color components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Rgba8> for Color {
    fn from(color: Rgba8) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A CSS color string: hex forms, `rgb(..)`/`rgba(..)`, `hsl(..)`, named
/// colors and `transparent`.
///
/// The string is kept exactly as given; no validation happens on assignment.
/// Unparseable strings resolve to opaque black when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssColor(String);

impl CssColor {
    /// The color string as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to RGBA8 components.
    pub fn rgba(&self) -> Rgba8 {
        parse_css_color(&self.0)
    }

    /// Resolve to a peniko color for rendering.
    pub fn to_color(&self) -> Color {
        self.rgba().into()
    }
}

impl From<&str> for CssColor {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CssColor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_css_color(color: &str) -> Rgba8 {
    let color = color.trim();
    if color.is_empty() {
        return Rgba8::transparent();
    }
    match parse_color(color) {
        Ok(parsed) => {
            let c = parsed.to_alpha_color::<Srgb>().to_rgba8();
            Rgba8::new(c.r, c.g, c.b, c.a)
        }
        Err(e) => {
            log::debug!("Unparseable color {:?}: {}", color, e);
            Rgba8::black()
        }
    }
}
