use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Font error: {0}")]
    Font(String),
    #[error("Image error: {0}")]
    Image(String),
    #[error("SVG error: {0}")]
    Svg(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid input: {0}")]
    Input(String),
    /// The mask leaves nowhere to put a word.
    #[error("Invalid mask: {0}")]
    InvalidMask(String),
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}
