//! Word rasterization: glyph coverage bitmaps and the footprints derived from
//! them.

use fontdue::Font;

use crate::grid::BitGrid;

/// Anti-aliased ink of a whole word, cropped to its ink bounds.
#[derive(Debug, Clone)]
pub(crate) struct GlyphBitmap {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) coverage: Vec<u8>,
    /// Start of the baseline relative to the bitmap's top-left corner.
    pub(crate) origin: (f32, f32),
}

impl GlyphBitmap {
    /// Rotates a quarter turn counter-clockwise, so horizontal text ends up
    /// reading bottom to top.
    pub(crate) fn rotated(&self) -> GlyphBitmap {
        let (w, h) = (self.width, self.height);
        let mut coverage = vec![0u8; self.coverage.len()];
        for y in 0..h {
            for x in 0..w {
                let (nx, ny) = (y, w - 1 - x);
                coverage[(ny * h + nx) as usize] = self.coverage[(y * w + x) as usize];
            }
        }
        GlyphBitmap {
            width: h,
            height: w,
            coverage,
            origin: (self.origin.1, w as f32 - self.origin.0),
        }
    }

    /// Non-zero coverage as `(x, y, alpha)`.
    pub(crate) fn ink(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        let w = self.width;
        self.coverage
            .iter()
            .enumerate()
            .filter(|(_, a)| **a > 0)
            .map(move |(i, a)| (i as u32 % w, i as u32 / w, *a))
    }

    /// The cells this word claims: its ink grown by `margin` on every side.
    /// The result is `2 * margin` larger than the bitmap in each dimension.
    pub(crate) fn footprint(&self, margin: u32) -> BitGrid {
        let m = margin as usize;
        let (w, h) = (self.width as usize, self.height as usize);
        let (fw, fh) = (w + 2 * m, h + 2 * m);

        // grow rows first, then columns
        let mut rows = vec![false; fw * h];
        for y in 0..h {
            for x in 0..w {
                if self.coverage[y * w + x] > 0 {
                    for fx in x..=x + 2 * m {
                        rows[y * fw + fx] = true;
                    }
                }
            }
        }

        let mut sprite = BitGrid::new(fw as u32, fh as u32);
        for y in 0..h {
            for fx in 0..fw {
                if rows[y * fw + fx] {
                    for fy in y..=y + 2 * m {
                        sprite.set(fx as i32, fy as i32);
                    }
                }
            }
        }
        sprite
    }
}

/// Lays `text` out on a single line at `size` px and rasterizes it. Returns
/// `None` when nothing in the text produces ink.
pub(crate) fn rasterize_text(text: &str, size: f32, font: &Font) -> Option<GlyphBitmap> {
    struct Placed {
        left: i32,
        top: i32,
        width: usize,
        height: usize,
        bitmap: Vec<u8>,
    }

    let mut glyphs = Vec::new();
    let mut pen_x = 0.0f32;
    let mut prev = None;

    for ch in text.chars() {
        if let Some(left) = prev {
            pen_x += font.horizontal_kern(left, ch, size).unwrap_or(0.0);
        }
        let (metrics, bitmap) = font.rasterize(ch, size);
        if metrics.width > 0 && metrics.height > 0 {
            glyphs.push(Placed {
                left: (pen_x + metrics.xmin as f32).round() as i32,
                // y grows downward from the baseline
                top: -(metrics.height as i32) - metrics.ymin,
                width: metrics.width,
                height: metrics.height,
                bitmap,
            });
        }
        pen_x += metrics.advance_width;
        prev = Some(ch);
    }

    let min_x = glyphs.iter().map(|g| g.left).min()?;
    let min_y = glyphs.iter().map(|g| g.top).min()?;
    let max_x = glyphs.iter().map(|g| g.left + g.width as i32).max()?;
    let max_y = glyphs.iter().map(|g| g.top + g.height as i32).max()?;

    let width = (max_x - min_x) as u32;
    let height = (max_y - min_y) as u32;
    let mut coverage = vec![0u8; (width * height) as usize];

    for glyph in &glyphs {
        let ox = (glyph.left - min_x) as usize;
        let oy = (glyph.top - min_y) as usize;
        for y in 0..glyph.height {
            for x in 0..glyph.width {
                let a = glyph.bitmap[y * glyph.width + x];
                let cell = &mut coverage[(oy + y) * width as usize + ox + x];
                *cell = (*cell).max(a);
            }
        }
    }

    if coverage.iter().all(|a| *a == 0) {
        return None;
    }

    Some(GlyphBitmap {
        width,
        height,
        coverage,
        origin: (-min_x as f32, -min_y as f32),
    })
}
