/*!
 * Mask WordCloud Library
 *
 * Packs the most frequent words of a text into the silhouette of an image and
 * colors every word with the pixels of that image.
 */

pub mod cache;
pub mod color;
pub mod composite;
pub mod error;
pub mod export;
pub mod font;
mod grid;
pub mod layout;
pub mod mask;
mod spiral;
mod sprite;
pub mod tokenizer;

use std::time::Instant;

use image::RgbaImage;

pub use crate::color::{Color, ColorSampler};
pub use crate::composite::{ColorMode, CompositeOptions, OutputRaster};
pub use crate::error::Error;
pub use crate::export::ExportFormat;
pub use crate::font::Typeface;
pub use crate::layout::{Footprint, LayoutConfig, PlacedWord, Rotation};
pub use crate::mask::{ImageColors, Mask};
pub use crate::tokenizer::{RankedWord, RankedWordList, Stopwords, Tokenizer};

/// Non-fatal conditions noticed while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No words were left after filtering; the output is the bare backdrop.
    EmptyCorpus,
    /// This many ranked words found no room in the mask.
    DroppedWords(usize),
}

// =============================================================================
// Builder
// =============================================================================

pub struct WordCloudBuilder {
    tokenizer: Tokenizer,
    stopwords: Stopwords,
    layout: LayoutConfig,
    composite: CompositeOptions,
    font_data: Option<Vec<u8>>,
    mask_size: Option<(u32, u32)>,
}

impl Default for WordCloudBuilder {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            stopwords: Stopwords::default(),
            layout: LayoutConfig::default(),
            composite: CompositeOptions::default(),
            font_data: None,
            mask_size: None,
        }
    }
}

impl WordCloudBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_words(mut self, max_words: usize) -> Self {
        self.tokenizer.max_words = max_words;
        self
    }

    pub fn max_font_size(mut self, size: u32) -> Self {
        self.layout.max_font_size = size;
        self
    }

    pub fn min_font_size(mut self, size: u32) -> Self {
        self.layout.min_font_size = size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.layout.seed = seed;
        self
    }

    /// Empty cells kept around each word.
    pub fn margin(mut self, margin: u32) -> Self {
        self.layout.margin = margin;
        self
    }

    pub fn prefer_horizontal(mut self, ratio: f32) -> Self {
        self.layout.prefer_horizontal = ratio;
        self
    }

    pub fn relative_scaling(mut self, scaling: f32) -> Self {
        self.layout.relative_scaling = scaling;
        self
    }

    pub fn shrink_factor(mut self, factor: f32) -> Self {
        self.layout.shrink_factor = factor;
        self
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.layout.max_attempts = Some(attempts);
        self
    }

    /// Drop every remaining word, without searching, once one word could not
    /// be placed even at the minimum font size.
    pub fn stop_when_full(mut self) -> Self {
        self.layout.stop_when_full = true;
        self
    }

    pub fn min_word_length(mut self, length: usize) -> Self {
        self.tokenizer.min_length = length;
        self
    }

    pub fn include_numbers(mut self, include: bool) -> Self {
        self.tokenizer.include_numbers = include;
        self
    }

    /// Replaces the stopword set.
    pub fn stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Adds to the current stopword set.
    pub fn extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords.extend(words);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.composite.background = color;
        self
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.composite.color_mode = mode;
        self
    }

    /// TrueType/OpenType data; without it a system sans-serif face is used.
    pub fn font(mut self, font_data: Vec<u8>) -> Self {
        self.font_data = Some(font_data);
        self
    }

    /// Scales masks decoded by [`WordCloud::render_bytes`] to this size.
    pub fn mask_size(mut self, width: u32, height: u32) -> Self {
        self.mask_size = Some((width, height));
        self
    }

    pub fn build(self) -> Result<WordCloud, Error> {
        if !(1..=tokenizer::MAX_WORDS_LIMIT).contains(&self.tokenizer.max_words) {
            return Err(Error::Input(format!(
                "max_words must be between 1 and {}",
                tokenizer::MAX_WORDS_LIMIT
            )));
        }
        if matches!(self.mask_size, Some((0, _)) | Some((_, 0))) {
            return Err(Error::Input("mask size must be non-zero".into()));
        }
        self.layout.validate()?;

        let typeface = match self.font_data {
            Some(data) => Typeface::from_bytes(data)?,
            None => Typeface::system_default()?,
        };

        Ok(WordCloud {
            tokenizer: self.tokenizer,
            stopwords: self.stopwords,
            layout: self.layout,
            composite: self.composite,
            typeface,
            mask_size: self.mask_size,
        })
    }
}

// =============================================================================
// Word Cloud
// =============================================================================

/// A validated configuration. Rendering borrows it immutably, so one instance
/// can serve concurrent renders.
#[derive(Debug)]
pub struct WordCloud {
    tokenizer: Tokenizer,
    stopwords: Stopwords,
    layout: LayoutConfig,
    composite: CompositeOptions,
    typeface: Typeface,
    mask_size: Option<(u32, u32)>,
}

impl WordCloud {
    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Counts words, packs them into `mask_image` and recolors them from it.
    pub fn render(&self, corpus: &str, mask_image: &RgbaImage) -> Result<Rendering, Error> {
        let start = Instant::now();

        // counting and mask analysis do not depend on each other
        let (words, analyzed) = std::thread::scope(|s| {
            let counter = s.spawn(|| self.tokenizer.count(corpus, &self.stopwords));
            let analyzed = mask::analyze(mask_image);
            let words = counter
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (words, analyzed)
        });
        let (mask, colors) = analyzed?;

        let mut warnings = Vec::new();
        if words.is_empty() {
            log::warn!("no words left after filtering; rendering an empty cloud");
            warnings.push(Warning::EmptyCorpus);
        }

        let placements = layout::layout(&words, &mask, &self.typeface, &self.layout)?;
        let dropped = words.len() - placements.len();
        if dropped > 0 {
            warnings.push(Warning::DroppedWords(dropped));
        }

        let raster = composite::composite(
            mask.width(),
            mask.height(),
            &placements,
            &self.typeface,
            &colors,
            &self.composite,
        );

        log::debug!(
            "rendered {}x{} cloud with {} of {} words in {:?}",
            raster.width(),
            raster.height(),
            placements.len(),
            words.len(),
            start.elapsed()
        );

        Ok(Rendering {
            words,
            placements,
            raster,
            warnings,
            colors,
            background: self.composite.background,
            font_family: self.typeface.family_name().to_string(),
        })
    }

    /// Like [`render`](Self::render), decoding the mask from PNG, JPEG, BMP or
    /// SVG bytes first.
    pub fn render_bytes(&self, corpus: &str, mask_bytes: &[u8]) -> Result<Rendering, Error> {
        let image = mask::load_mask(mask_bytes, self.mask_size)?;
        self.render(corpus, &image)
    }
}

// =============================================================================
// Output
// =============================================================================

/// Everything one render produced.
#[derive(Debug)]
pub struct Rendering {
    pub words: RankedWordList,
    pub placements: Vec<PlacedWord>,
    pub raster: OutputRaster,
    pub warnings: Vec<Warning>,
    colors: ImageColors,
    background: Color,
    font_family: String,
}

impl Rendering {
    /// The cloud next to the source image, for comparison.
    pub fn side_by_side(&self) -> RgbaImage {
        composite::side_by_side(&self.raster, self.colors.image(), self.background)
    }

    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, Error> {
        export::encode(&self.raster, format)
    }

    pub fn data_uri(&self, format: ExportFormat) -> Result<String, Error> {
        export::data_uri(&self.raster, format)
    }

    pub fn to_svg(&self) -> String {
        export::to_svg(
            self.raster.width(),
            self.raster.height(),
            &self.placements,
            &self.colors,
            &self.font_family,
            self.background,
        )
    }
}

/// Renders with default settings and the system font.
pub fn generate(corpus: &str, mask_image: &RgbaImage) -> Result<Rendering, Error> {
    WordCloudBuilder::new().build()?.render(corpus, mask_image)
}
