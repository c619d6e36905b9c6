//! Greedy word placement inside the free region of a mask.
//!
//! Words are taken in rank order. Each one gets a font size derived from the
//! previous word's, is rasterized into a footprint and walked along a spiral
//! until the footprint lands on cells that are free in the mask and not yet
//! taken. Words that do not fit shrink; words that never fit are dropped.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::Error;
use crate::font::Typeface;
use crate::grid::BitGrid;
use crate::mask::Mask;
use crate::spiral::Spiral;
use crate::sprite::{rasterize_text, GlyphBitmap};
use crate::tokenizer::{RankedWord, RankedWordList};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Size of the top-ranked word, in pixels.
    pub max_font_size: u32,
    /// Words that do not fit at this size are dropped.
    pub min_font_size: u32,
    /// Multiplier applied when a word does not fit; each step shrinks by at
    /// least one pixel.
    pub shrink_factor: f32,
    /// How strongly counts drive size: 0 keeps the previous size, 1 makes size
    /// proportional to count.
    pub relative_scaling: f32,
    /// Probability that a word tries the horizontal orientation first.
    pub prefer_horizontal: f32,
    /// Empty cells kept around each word's ink.
    pub margin: u32,
    /// Cap on spiral positions tried per word, size and orientation.
    pub max_attempts: Option<usize>,
    /// After the first word that cannot be placed at `min_font_size`, drop all
    /// remaining words without searching.
    pub stop_when_full: bool,
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_font_size: 60,
            min_font_size: 4,
            shrink_factor: 0.9,
            relative_scaling: 0.5,
            prefer_horizontal: 0.9,
            margin: 2,
            max_attempts: None,
            stop_when_full: false,
            seed: 42,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_font_size == 0 {
            return Err(Error::Input("min_font_size must be at least 1".into()));
        }
        if self.max_font_size < self.min_font_size {
            return Err(Error::Input(format!(
                "max_font_size ({}) is below min_font_size ({})",
                self.max_font_size, self.min_font_size
            )));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(Error::Input("shrink_factor must be in (0, 1)".into()));
        }
        if !(0.0..=1.0).contains(&self.relative_scaling) {
            return Err(Error::Input("relative_scaling must be in [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.prefer_horizontal) {
            return Err(Error::Input("prefer_horizontal must be in [0, 1]".into()));
        }
        if self.max_attempts == Some(0) {
            return Err(Error::Input("max_attempts must be positive".into()));
        }
        Ok(())
    }

    /// Starting size for a word given the previously placed one. Never larger
    /// than the previous size or `ceiling`, never below the floor.
    fn candidate_size(&self, count: u32, previous: Option<(u32, u32)>, ceiling: u32) -> u32 {
        let Some((prev_count, prev_size)) = previous else {
            return self.max_font_size.min(ceiling).max(self.min_font_size);
        };
        let rs = self.relative_scaling;
        let ratio = count as f32 / prev_count.max(1) as f32;
        let size = ((rs * ratio + (1.0 - rs)) * prev_size as f32).round() as u32;
        size.clamp(self.min_font_size, prev_size.max(self.min_font_size))
    }

    fn shrink(&self, size: u32) -> u32 {
        let next = (size as f32 * self.shrink_factor).round() as u32;
        next.min(size.saturating_sub(1)).max(self.min_font_size)
    }
}

// =============================================================================
// Placed Words
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Horizontal,
    /// A quarter turn counter-clockwise.
    Vertical,
}

impl Rotation {
    pub fn degrees(self) -> f32 {
        match self {
            Rotation::Horizontal => 0.0,
            Rotation::Vertical => 90.0,
        }
    }
}

/// Cells covered by a placed word, including its margin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Footprint {
    x: u32,
    y: u32,
    cells: BitGrid,
}

impl Footprint {
    /// Left edge of the footprint's bounding box.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Top edge of the footprint's bounding box.
    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.cells.width()
    }

    pub fn height(&self) -> u32 {
        self.cells.height()
    }

    /// Covered cells in canvas coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.cells
            .ones()
            .map(move |(x, y)| (self.x + x, self.y + y))
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && self.cells.get(x - self.x, y - self.y)
    }

    pub fn len(&self) -> usize {
        self.cells.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &Footprint) -> bool {
        let disjoint = self.x + self.width() <= other.x
            || other.x + other.width() <= self.x
            || self.y + self.height() <= other.y
            || other.y + other.height() <= self.y;
        !disjoint && self.cells().any(|(x, y)| other.contains(x, y))
    }
}

/// A word committed to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub count: u32,
    /// Position in the ranked list the word came from.
    pub rank: usize,
    pub font_size: u32,
    /// Top-left corner of the word's ink.
    pub x: u32,
    pub y: u32,
    pub rotation: Rotation,
    pub footprint: Footprint,
    /// Start of the text baseline in canvas coordinates.
    pub baseline: (f32, f32),
}

impl PlacedWord {
    /// Re-rasterizes the word exactly as it was measured during layout.
    pub(crate) fn glyph(&self, typeface: &Typeface) -> Option<GlyphBitmap> {
        let glyph = rasterize_text(&self.text, self.font_size as f32, typeface.font())?;
        Some(match self.rotation {
            Rotation::Horizontal => glyph,
            Rotation::Vertical => glyph.rotated(),
        })
    }
}

// =============================================================================
// Occupancy
// =============================================================================

/// Cells that can no longer take ink: blocked by the mask or already covered
/// by a placed word. Owned by a single layout run.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    mask: BitGrid,
    taken: BitGrid,
}

impl OccupancyGrid {
    pub fn new(mask: &Mask) -> Self {
        Self {
            mask: mask.blocked().clone(),
            taken: mask.blocked().clone(),
        }
    }

    /// True if a free cell of the mask has been covered by a word.
    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        self.taken.get(x, y) && !self.mask.get(x, y)
    }

    /// Number of free cells covered so far.
    pub fn covered_cells(&self) -> usize {
        self.taken.ones().filter(|(x, y)| !self.mask.get(*x, *y)).count()
    }

    fn fits(&self, sprite: &BitGrid, x: i32, y: i32) -> bool {
        !self.taken.collides(sprite, x, y)
    }

    fn occupy(&mut self, sprite: &BitGrid, x: i32, y: i32) {
        self.taken.stamp(sprite, x, y);
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Places `words` in rank order inside the free region of `mask`.
///
/// The result is fully determined by the inputs: each word draws its random
/// choices from a ChaCha stream keyed by `config.seed` and the word's rank.
/// Words that cannot be placed are left out; only an unusable mask or an
/// invalid configuration is an error.
pub fn layout(
    words: &RankedWordList,
    mask: &Mask,
    typeface: &Typeface,
    config: &LayoutConfig,
) -> Result<Vec<PlacedWord>, Error> {
    config.validate()?;

    if mask.free_cells() == 0 {
        return Err(Error::InvalidMask("mask has no free pixels".into()));
    }
    if mask.width() < config.min_font_size || mask.height() < config.min_font_size {
        return Err(Error::InvalidMask(format!(
            "mask is {}x{}, smaller than the minimum font size {}",
            mask.width(),
            mask.height(),
            config.min_font_size
        )));
    }

    // larger sizes cannot fit the free region in either orientation
    let bounds = mask.free_bounds();
    let ceiling = bounds.width.max(bounds.height);

    let mut grid = OccupancyGrid::new(mask);
    let placer = Placer {
        typeface,
        config,
        mask,
    };

    let mut placed: Vec<PlacedWord> = Vec::with_capacity(words.len());
    let mut previous = None;
    let mut dropped = 0usize;
    let mut saturated = false;

    for (rank, word) in words.iter().enumerate() {
        if saturated {
            dropped += 1;
            continue;
        }

        let size = config.candidate_size(word.count, previous, ceiling);
        match placer.place(word, rank, size, &mut grid) {
            Some(placement) => {
                previous = Some((word.count, placement.font_size));
                placed.push(placement);
            }
            None => {
                log::debug!(
                    "dropped '{}' (rank {rank}): no room even at {}px",
                    word.text,
                    config.min_font_size
                );
                dropped += 1;
                if config.stop_when_full {
                    saturated = true;
                }
            }
        }
    }

    log::debug!(
        "layout placed {} of {} words ({dropped} dropped), {} of {} free cells covered",
        placed.len(),
        words.len(),
        grid.covered_cells(),
        mask.free_cells()
    );

    Ok(placed)
}

struct Placer<'a> {
    typeface: &'a Typeface,
    config: &'a LayoutConfig,
    mask: &'a Mask,
}

impl Placer<'_> {
    fn place(
        &self,
        word: &RankedWord,
        rank: usize,
        start_size: u32,
        grid: &mut OccupancyGrid,
    ) -> Option<PlacedWord> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(rank as u64);

        let horizontal_first = rng.random::<f32>() < self.config.prefer_horizontal;
        let orientations: &[Rotation] = if self.config.prefer_horizontal >= 1.0 {
            &[Rotation::Horizontal]
        } else if horizontal_first {
            &[Rotation::Horizontal, Rotation::Vertical]
        } else {
            &[Rotation::Vertical, Rotation::Horizontal]
        };

        let dt = if rng.random_bool(0.5) { 1 } else { -1 };
        let bounds = self.mask.free_bounds();
        let (cx, cy) = bounds.center();
        let jitter_x = (bounds.width / 8) as i32;
        let jitter_y = (bounds.height / 8) as i32;
        let start = (
            cx + rng.random_range(-jitter_x..=jitter_x),
            cy + rng.random_range(-jitter_y..=jitter_y),
        );

        let margin = self.config.margin;
        let mut size = start_size;
        loop {
            for &rotation in orientations {
                let Some(glyph) = rasterize_text(&word.text, size as f32, self.typeface.font())
                else {
                    continue;
                };
                let glyph = match rotation {
                    Rotation::Horizontal => glyph,
                    Rotation::Vertical => glyph.rotated(),
                };
                let sprite = glyph.footprint(margin);

                if let Some((x, y)) = self.search(grid, &sprite, start, dt) {
                    grid.occupy(&sprite, x, y);
                    let (fx, fy) = (x as u32, y as u32);
                    return Some(PlacedWord {
                        text: word.text.clone(),
                        count: word.count,
                        rank,
                        font_size: size,
                        x: fx + margin,
                        y: fy + margin,
                        rotation,
                        baseline: (
                            (fx + margin) as f32 + glyph.origin.0,
                            (fy + margin) as f32 + glyph.origin.1,
                        ),
                        footprint: Footprint {
                            x: fx,
                            y: fy,
                            cells: sprite,
                        },
                    });
                }
            }

            if size <= self.config.min_font_size {
                return None;
            }
            size = self.config.shrink(size);
        }
    }

    /// First spiral position, centred on `start`, where the sprite fits.
    fn search(
        &self,
        grid: &OccupancyGrid,
        sprite: &BitGrid,
        start: (i32, i32),
        dt: i32,
    ) -> Option<(i32, i32)> {
        let bounds = self.mask.free_bounds();
        if sprite.width() > bounds.width || sprite.height() > bounds.height {
            return None;
        }

        let half_w = sprite.width() as i32 / 2;
        let half_h = sprite.height() as i32 / 2;
        let spiral = Spiral::new(self.mask.width(), self.mask.height(), dt);
        let limit = self.config.max_attempts.unwrap_or(usize::MAX);

        spiral
            .take(limit)
            .map(|(dx, dy)| (start.0 + dx - half_w, start.1 + dy - half_h))
            // footprints touch all four sides of their box, so a fit is on-canvas
            .find(|&(x, y)| x >= 0 && y >= 0 && grid.fits(sprite, x, y))
    }
}
