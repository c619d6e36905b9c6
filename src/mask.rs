//! Mask analysis: which pixels of the silhouette may hold words, and what
//! color the source image has at each pixel.

use image::{GenericImageView, RgbaImage};
use tiny_skia::{Pixmap, Transform};

use crate::color::{Color, ColorSampler};
use crate::error::Error;
use crate::grid::BitGrid;

/// Masks narrower or shorter than this are rejected.
pub const MIN_MASK_SIDE: u32 = 8;

/// Pixels at least this bright (sum of r, g, b) count as background.
const WHITE_THRESHOLD: u16 = 750;
/// Pixels less opaque than this count as background.
const ALPHA_THRESHOLD: u8 = 128;

/// True for pixels words must stay off: transparent or near-white.
pub fn is_blocked_pixel(rgba: [u8; 4]) -> bool {
    let [r, g, b, a] = rgba;
    let sum = r as u16 + g as u16 + b as u16;
    a < ALPHA_THRESHOLD || sum >= WHITE_THRESHOLD
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }
}

/// Free/blocked classification of every canvas pixel.
#[derive(Debug, Clone)]
pub struct Mask {
    blocked: BitGrid,
    free_cells: usize,
    free_bounds: Rect,
}

impl Mask {
    /// Builds a mask from a predicate returning `true` for free cells.
    pub fn from_fn<F>(width: u32, height: u32, mut is_free: F) -> Result<Self, Error>
    where
        F: FnMut(u32, u32) -> bool,
    {
        if width < MIN_MASK_SIDE || height < MIN_MASK_SIDE {
            return Err(Error::InvalidMask(format!(
                "mask is {width}x{height}, smaller than the {MIN_MASK_SIDE}x{MIN_MASK_SIDE} minimum"
            )));
        }

        let mut blocked = BitGrid::canvas(width, height);
        let mut free_cells = 0usize;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0, 0);

        for y in 0..height {
            for x in 0..width {
                if is_free(x, y) {
                    free_cells += 1;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                } else {
                    blocked.set(x as i32, y as i32);
                }
            }
        }

        if free_cells == 0 {
            return Err(Error::InvalidMask(
                "mask has no free pixels to place words in".into(),
            ));
        }

        Ok(Self {
            blocked,
            free_cells,
            free_bounds: Rect {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            },
        })
    }

    /// A mask with every cell free.
    pub fn full(width: u32, height: u32) -> Result<Self, Error> {
        Self::from_fn(width, height, |_, _| true)
    }

    pub fn width(&self) -> u32 {
        self.blocked.width()
    }

    pub fn height(&self) -> u32 {
        self.blocked.height()
    }

    pub fn is_free(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && !self.blocked.get(x, y)
    }

    pub fn free_cells(&self) -> usize {
        self.free_cells
    }

    /// Bounding box of the free region.
    pub fn free_bounds(&self) -> Rect {
        self.free_bounds
    }

    pub(crate) fn blocked(&self) -> &BitGrid {
        &self.blocked
    }
}

/// Classifies `image` into a [`Mask`] and keeps its pixels for recoloring.
pub fn analyze(image: &RgbaImage) -> Result<(Mask, ImageColors), Error> {
    let mask = Mask::from_fn(image.width(), image.height(), |x, y| {
        !is_blocked_pixel(image.get_pixel(x, y).0)
    })?;
    log::debug!(
        "mask {}x{}: {} free pixels in {:?}",
        mask.width(),
        mask.height(),
        mask.free_cells(),
        mask.free_bounds()
    );
    Ok((mask, ImageColors::new(image.clone())))
}

// =============================================================================
// Image Colors
// =============================================================================

/// Samples the original image; positions past the edge clamp to it.
#[derive(Debug, Clone)]
pub struct ImageColors {
    image: RgbaImage,
}

impl ImageColors {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl ColorSampler for ImageColors {
    fn sample(&self, x: u32, y: u32) -> Color {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return Color::BLACK;
        }
        Color::from(*self.image.get_pixel(x.min(w - 1), y.min(h - 1)))
    }
}

// =============================================================================
// Mask Loading
// =============================================================================

/// Decodes mask bytes: SVG documents are rendered over white, anything else
/// goes through the raster decoders. With `size` the result is scaled to
/// exactly that many pixels.
pub fn load_mask(bytes: &[u8], size: Option<(u32, u32)>) -> Result<RgbaImage, Error> {
    // Try 1: SVG
    let opt = usvg::Options::default();
    if let Ok(tree) = usvg::Tree::from_data(bytes, &opt) {
        let intrinsic = tree.size().to_int_size();
        let (width, height) = size.unwrap_or((intrinsic.width(), intrinsic.height()));
        let scale_x = width as f32 / intrinsic.width() as f32;
        let scale_y = height as f32 / intrinsic.height() as f32;

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Svg(format!("Cannot allocate a {width}x{height} mask")))?;
        // transparent areas would otherwise count as blocked for a different reason
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, Transform::from_scale(scale_x, scale_y), &mut pixmap.as_mut());

        let mut image = RgbaImage::new(width, height);
        for (x, y, px) in image.enumerate_pixels_mut() {
            if let Some(p) = pixmap.pixel(x, y) {
                let p = p.demultiply();
                *px = image::Rgba([p.red(), p.green(), p.blue(), p.alpha()]);
            }
        }
        return Ok(image);
    }

    // Try 2: PNG, JPEG, BMP
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::Image(format!("The mask format could not be determined: {e}")))?;
    let decoded = match size {
        Some((w, h)) if decoded.dimensions() != (w, h) => {
            decoded.resize_exact(w, h, image::imageops::FilterType::Nearest)
        }
        _ => decoded,
    };
    Ok(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(size: u32) -> RgbaImage {
        let r = size as f32 / 2.0;
        RgbaImage::from_fn(size, size, |x, y| {
            let (dx, dy) = (x as f32 + 0.5 - r, y as f32 + 0.5 - r);
            if dx * dx + dy * dy <= r * r * 0.5 {
                image::Rgba([200, 30, 30, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn test_threshold() {
        assert!(is_blocked_pixel([255, 255, 255, 255]));
        assert!(is_blocked_pixel([250, 250, 250, 255]));
        assert!(is_blocked_pixel([0, 0, 0, 0]));
        assert!(!is_blocked_pixel([0, 0, 0, 255]));
        assert!(!is_blocked_pixel([249, 250, 250, 255]));
    }

    #[test]
    fn test_analyze_disc() {
        let image = disc(64);
        let (mask, colors) = analyze(&image).unwrap();
        assert_eq!((mask.width(), mask.height()), (64, 64));
        assert!(mask.is_free(32, 32));
        assert!(!mask.is_free(0, 0));
        assert!(!mask.is_free(64, 0));
        assert!(mask.free_cells() > 0 && mask.free_cells() < 64 * 64);

        let bounds = mask.free_bounds();
        assert!(bounds.x > 0 && bounds.x + bounds.width < 64);
        assert_eq!(bounds.center(), (32, 32));

        // colors are kept for blocked pixels too
        assert_eq!(colors.sample(0, 0), Color::WHITE);
        assert_eq!(colors.sample(32, 32), Color::rgb(200, 30, 30));
        assert_eq!(colors.sample(500, 500), Color::WHITE);
    }

    #[test]
    fn test_all_white_is_invalid() {
        let image = RgbaImage::from_pixel(32, 32, image::Rgba([255, 255, 255, 255]));
        assert!(matches!(analyze(&image), Err(Error::InvalidMask(_))));
    }

    #[test]
    fn test_too_small_is_invalid() {
        let image = RgbaImage::from_pixel(4, 40, image::Rgba([0, 0, 0, 255]));
        assert!(matches!(analyze(&image), Err(Error::InvalidMask(_))));
    }

    #[test]
    fn test_load_svg_mask() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20">
            <rect x="5" y="5" width="10" height="10" fill="black"/></svg>"#;
        let image = load_mask(svg, Some((40, 40))).unwrap();
        assert_eq!(image.dimensions(), (40, 40));
        let (mask, _) = analyze(&image).unwrap();
        assert!(mask.is_free(20, 20));
        assert!(!mask.is_free(2, 2));
    }

    #[test]
    fn test_load_png_mask() {
        let mut png = std::io::Cursor::new(Vec::new());
        disc(16).write_to(&mut png, image::ImageFormat::Png).unwrap();
        let image = load_mask(png.get_ref(), Some((32, 32))).unwrap();
        assert_eq!(image.dimensions(), (32, 32));
        assert!(load_mask(b"not an image", None).is_err());
    }
}
