//! Series colors: a fixed palette cycled by series index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChartError;

/// 8-bit RGB color; serializes as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || ChartError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = ChartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Default series palette (blue, green, yellow, red, cyan, teal, orange, purple, pink).
const DEFAULT9: [Rgb; 9] = [
    Rgb::new(0x54, 0x70, 0xc6), // blue   (#5470c6)
    Rgb::new(0x91, 0xcc, 0x75), // green  (#91cc75)
    Rgb::new(0xfa, 0xc8, 0x58), // yellow (#fac858)
    Rgb::new(0xee, 0x66, 0x66), // red    (#ee6666)
    Rgb::new(0x73, 0xc0, 0xde), // cyan   (#73c0de)
    Rgb::new(0x3b, 0xa2, 0x72), // teal   (#3ba272)
    Rgb::new(0xfc, 0x84, 0x52), // orange (#fc8452)
    Rgb::new(0x9a, 0x60, 0xb4), // purple (#9a60b4)
    Rgb::new(0xea, 0x7c, 0xcc), // pink   (#ea7ccc)
];

/// A fixed, non-empty color list handed out in order and wrapped modulo its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT9.to_vec(),
        }
    }
}

impl Palette {
    /// Custom palette; an empty list falls back to the default one.
    pub fn new(colors: Vec<Rgb>) -> Self {
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    /// Parse a list of `#RRGGBB` strings.
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, ChartError> {
        let colors = hex
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Rgb>, _>>()?;
        Ok(Self::new(colors))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for series `idx`, wrapping past the end.
    #[inline]
    pub fn pick(&self, idx: usize) -> Rgb {
        self.colors[idx % self.colors.len()]
    }

    /// `n` colors: the first `n` entries, cycling once the palette is exhausted.
    pub fn colors_for(&self, n: usize) -> Vec<Rgb> {
        (0..n).map(|i| self.pick(i)).collect()
    }
}
