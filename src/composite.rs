//! Drawing placed words onto the output raster.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::color::{Color, ColorSampler};
use crate::font::Typeface;
use crate::layout::PlacedWord;

/// The finished word cloud, same size as the mask.
pub type OutputRaster = RgbaImage;

/// Where a word's ink color comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Every glyph pixel takes the sampled color under it.
    #[default]
    PerPixel,
    /// The whole word takes the mean sampled color over its footprint.
    WordMean,
}

#[derive(Debug, Clone)]
pub struct CompositeOptions {
    pub background: Color,
    pub color_mode: ColorMode,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            color_mode: ColorMode::PerPixel,
        }
    }
}

/// The canvas before any word is drawn.
pub fn backdrop(width: u32, height: u32, background: Color) -> OutputRaster {
    RgbaImage::from_pixel(width, height, background.into())
}

/// Draws `placements` in order over the backdrop, coloring ink from `sampler`.
pub fn composite<S: ColorSampler>(
    width: u32,
    height: u32,
    placements: &[PlacedWord],
    typeface: &Typeface,
    sampler: &S,
    options: &CompositeOptions,
) -> OutputRaster {
    let mut raster = backdrop(width, height, options.background);

    for word in placements {
        let Some(glyph) = word.glyph(typeface) else {
            log::warn!("'{}' produced no ink at {}px", word.text, word.font_size);
            continue;
        };
        let word_color = match options.color_mode {
            ColorMode::PerPixel => None,
            ColorMode::WordMean => sampler.mean(word.footprint.cells()),
        };

        for (gx, gy, alpha) in glyph.ink() {
            let (x, y) = (word.x + gx, word.y + gy);
            if x >= width || y >= height {
                continue;
            }
            let color = word_color.unwrap_or_else(|| sampler.sample(x, y)).opaque();
            blend(raster.get_pixel_mut(x, y), color, alpha);
        }
    }

    raster
}

/// Source-over compositing of `color` at `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: u8) {
    let sa = coverage as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let mix = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Word cloud on the left, source image on the right in a 3:2 width split.
/// The source is scaled to fit its panel and centred in it.
pub fn side_by_side(cloud: &RgbaImage, source: &RgbaImage, background: Color) -> RgbaImage {
    let (cw, ch) = cloud.dimensions();
    let panel_w = (cw * 2 / 3).max(1);
    let mut out = RgbaImage::from_pixel(cw + panel_w, ch, background.into());
    imageops::overlay(&mut out, cloud, 0, 0);

    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 || ch == 0 {
        return out;
    }
    let scale = (panel_w as f32 / sw as f32).min(ch as f32 / sh as f32);
    let nw = ((sw as f32 * scale).round() as u32).clamp(1, panel_w);
    let nh = ((sh as f32 * scale).round() as u32).clamp(1, ch);
    let scaled = imageops::resize(source, nw, nh, FilterType::Triangle);

    let x = cw + (panel_w - nw) / 2;
    let y = (ch - nh) / 2;
    imageops::overlay(&mut out, &scaled, x as i64, y as i64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_full_and_partial_coverage() {
        let mut px = Rgba([255, 255, 255, 255]);
        blend(&mut px, Color::BLACK, 255);
        assert_eq!(px, Rgba([0, 0, 0, 255]));

        let mut px = Rgba([255, 255, 255, 255]);
        blend(&mut px, Color::BLACK, 0);
        assert_eq!(px, Rgba([255, 255, 255, 255]));

        let mut px = Rgba([200, 200, 200, 255]);
        blend(&mut px, Color::rgb(0, 0, 0), 128);
        assert!(px[0] > 90 && px[0] < 110);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_blend_onto_transparent() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend(&mut px, Color::rgb(10, 20, 30), 51);
        assert_eq!(px, Rgba([10, 20, 30, 51]));
    }

    #[test]
    fn test_backdrop() {
        let raster = backdrop(5, 4, Color::rgb(1, 2, 3));
        assert_eq!(raster.dimensions(), (5, 4));
        assert!(raster.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_side_by_side_dimensions() {
        let cloud = RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 255]));
        let source = RgbaImage::from_pixel(50, 100, Rgba([255, 0, 0, 255]));
        let out = side_by_side(&cloud, &source, Color::WHITE);
        assert_eq!(out.dimensions(), (500, 200));
        assert_eq!(*out.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
        // source scaled to 100x200 and centred in the 200px panel
        assert_eq!(*out.get_pixel(400, 100), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(310, 100), Rgba([255, 255, 255, 255]));
    }
}
