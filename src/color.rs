use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rrggbb` notation; alpha is not represented.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(p: image::Rgba<u8>) -> Self {
        Color::rgba(p[0], p[1], p[2], p[3])
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        image::Rgba(c.to_array())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`, with or without the `#`.
impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| Error::Input(format!("Invalid color '{s}'")))
        };
        match hex.len() {
            3 => {
                let r = channel(0..1)?;
                let g = channel(1..2)?;
                let b = channel(2..3)?;
                Ok(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(Error::Input(format!("Invalid color '{s}'"))),
        }
    }
}

// =============================================================================
// Color Sampling
// =============================================================================

/// Maps a canvas position to the color a glyph pixel there should take.
pub trait ColorSampler {
    fn sample(&self, x: u32, y: u32) -> Color;

    /// Average color over a set of cells; `None` when `cells` is empty.
    fn mean<I>(&self, cells: I) -> Option<Color>
    where
        I: IntoIterator<Item = (u32, u32)>,
        Self: Sized,
    {
        let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
        for (x, y) in cells {
            let c = self.sample(x, y);
            r += u64::from(c.r);
            g += u64::from(c.g);
            b += u64::from(c.b);
            n += 1;
        }
        (n > 0).then(|| Color::rgb((r / n) as u8, (g / n) as u8, (b / n) as u8))
    }
}

impl ColorSampler for Color {
    fn sample(&self, _x: u32, _y: u32) -> Color {
        *self
    }
}

impl<F> ColorSampler for F
where
    F: Fn(u32, u32) -> Color,
{
    fn sample(&self, x: u32, y: u32) -> Color {
        self(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#FFFFFF".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("264653".parse::<Color>().unwrap(), Color::rgb(0x26, 0x46, 0x53));
        assert_eq!("#f00".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(
            "#00000000".parse::<Color>().unwrap(),
            Color::TRANSPARENT
        );
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn test_hex_roundtrip() {
        let c = Color::rgb(0x2a, 0x9d, 0x8f);
        assert_eq!(c.to_hex(), "#2a9d8f");
    }

    #[test]
    fn test_mean_of_closure_sampler() {
        let sampler = |x: u32, _y: u32| if x == 0 { Color::BLACK } else { Color::WHITE };
        assert_eq!(
            sampler.mean([(0, 0), (1, 0)]),
            Some(Color::rgb(127, 127, 127))
        );
        assert_eq!(sampler.mean(std::iter::empty()), None);
    }
}
