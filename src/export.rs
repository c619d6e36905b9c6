//! Encoding finished rasters for download or embedding.

use std::fmt::Write as _;
use std::io::Cursor;
use std::str::FromStr;

use base64::Engine as _;
use image::{DynamicImage, ImageFormat};

use crate::color::{Color, ColorSampler};
use crate::composite::OutputRaster;
use crate::error::Error;
use crate::layout::{PlacedWord, Rotation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    #[default]
    Png,
    /// Lossy; the alpha channel is dropped.
    Jpeg,
    Bmp,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Bmp => "image/bmp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "bmp" => Ok(ExportFormat::Bmp),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Encodes the raster; on error nothing is returned.
pub fn encode(raster: &OutputRaster, format: ExportFormat) -> Result<Vec<u8>, Error> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ExportFormat::Png => raster.write_to(&mut buf, ImageFormat::Png)?,
        ExportFormat::Bmp => raster.write_to(&mut buf, ImageFormat::Bmp)?,
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
            rgb.write_to(&mut buf, ImageFormat::Jpeg)?
        }
    }
    Ok(buf.into_inner())
}

/// `data:` URI with the base64-encoded image, ready for an `href` or `src`.
pub fn data_uri(raster: &OutputRaster, format: ExportFormat) -> Result<String, Error> {
    let bytes = encode(raster, format)?;
    Ok(format!(
        "data:{};base64,{}",
        format.mime_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

// =============================================================================
// SVG
// =============================================================================

/// Vector rendition of a layout. Each word is filled with the mean sampled
/// color over its footprint.
pub fn to_svg<S: ColorSampler>(
    width: u32,
    height: u32,
    placements: &[PlacedWord],
    sampler: &S,
    font_family: &str,
    background: Color,
) -> String {
    let mut svg = String::with_capacity(8192);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    if background.a > 0 {
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}" fill-opacity="{:.3}"/>"#,
            background.to_hex(),
            background.a as f32 / 255.0
        );
    }

    let _ = write!(
        svg,
        r#"<style>text{{font-family:'{}',Arial,sans-serif}}</style>"#,
        escape_xml(font_family)
    );

    for word in placements {
        let color = sampler
            .mean(word.footprint.cells())
            .unwrap_or(Color::BLACK);
        let (x, y) = word.baseline;
        let transform = match word.rotation {
            Rotation::Horizontal => String::new(),
            Rotation::Vertical => format!(r#" transform="rotate(-90 {x:.1} {y:.1})""#),
        };
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" fill="{}" font-size="{}"{transform}>{}</text>"#,
            color.to_hex(),
            word.font_size,
            escape_xml(&word.text)
        );
    }

    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
