//! Signature capture: pointer input painted onto a raster surface and exported
//! as a `data:image/png;base64,` string.

use thiserror::Error;

pub mod canvas;
pub mod encode;
pub mod geometry;
pub mod pad;
pub mod theme;

pub use canvas::{Canvas, Rgba};
pub use encode::PNG_DATA_URL_PREFIX;
pub use geometry::{BoundingRect, Point, PointerEvent};
pub use pad::{PadConfig, SignaturePad, Stroke};
pub use theme::{Subscription, Theme, ThemeSignal};

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid colour: {0}")]
    InvalidColor(String),
    #[error("png encoding failed: {0}")]
    Encoding(String),
}
