//! Pixel-level image comparison.
//!
//! A pixel counts as different when any RGBA channel moves by more than
//! `threshold` on a 0.0-1.0 scale. The metric is *how much of the image*
//! changed, not how severe each change is: uniform faint noise above the
//! threshold still scores high.

use crate::result::{InkcheckError, InkcheckResult};
use image::{ImageEncoder, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Colour used for differing pixels
pub const DIFF_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Semi-transparent fill for a dimension-mismatch overlay
pub const MISMATCH_COLOR: Rgba<u8> = Rgba([255, 0, 0, 128]);

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Read dimensions from PNG bytes
    pub fn of_png(png: &[u8]) -> InkcheckResult<Self> {
        let image = decode_png(png, "screenshot")?;
        Ok(Self::new(image.width(), image.height()))
    }

    /// Total pixel count
    #[must_use]
    pub const fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of comparing two images
#[derive(Debug, Clone)]
pub enum DiffOutcome {
    /// No pixel exceeded the threshold
    Identical {
        /// Shared dimensions
        dimensions: Dimensions,
    },
    /// Same size, some pixels differ
    Different {
        /// Number of pixels above threshold
        diff_pixel_count: usize,
        /// Total pixels compared
        total_pixels: usize,
        /// Visualization with differing pixels in [`DIFF_COLOR`]
        diff_image: RgbaImage,
    },
    /// Sizes differ; no pixel comparison attempted
    DimensionMismatch {
        /// Actual image size
        actual: Dimensions,
        /// Baseline image size
        baseline: Dimensions,
        /// Uniform overlay sized to the larger of the two
        overlay: RgbaImage,
    },
}

impl DiffOutcome {
    /// Percentage (0.0-100.0) of pixels above threshold
    #[must_use]
    pub fn diff_percentage(&self) -> f64 {
        match self {
            Self::Identical { .. } => 0.0,
            Self::Different {
                diff_pixel_count,
                total_pixels,
                ..
            } => {
                if *total_pixels == 0 {
                    0.0
                } else {
                    (*diff_pixel_count as f64 / *total_pixels as f64) * 100.0
                }
            }
            Self::DimensionMismatch { .. } => 100.0,
        }
    }

    /// Whether the comparison found no differences
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        matches!(self, Self::Identical { .. })
    }

    /// Image worth persisting for human inspection, if any
    #[must_use]
    pub const fn artifact(&self) -> Option<&RgbaImage> {
        match self {
            Self::Identical { .. } => None,
            Self::Different { diff_image, .. } => Some(diff_image),
            Self::DimensionMismatch { overlay, .. } => Some(overlay),
        }
    }
}

/// Per-pixel image comparator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDiffer {
    threshold: f64,
}

impl Default for ImageDiffer {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl ImageDiffer {
    /// Create a differ with a per-channel threshold (clamped to 0.0-1.0)
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Per-channel threshold
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare two PNG byte buffers
    ///
    /// # Errors
    ///
    /// Returns error if either image cannot be decoded
    pub fn compare(&self, actual: &[u8], baseline: &[u8]) -> InkcheckResult<DiffOutcome> {
        let actual = decode_png(actual, "actual")?;
        let baseline = decode_png(baseline, "baseline")?;
        Ok(self.compare_images(&actual, &baseline))
    }

    /// Compare two decoded images
    #[must_use]
    pub fn compare_images(&self, actual: &RgbaImage, baseline: &RgbaImage) -> DiffOutcome {
        let actual_dims = Dimensions::new(actual.width(), actual.height());
        let baseline_dims = Dimensions::new(baseline.width(), baseline.height());

        if actual_dims != baseline_dims {
            let overlay = RgbaImage::from_pixel(
                actual_dims.width.max(baseline_dims.width),
                actual_dims.height.max(baseline_dims.height),
                MISMATCH_COLOR,
            );
            return DiffOutcome::DimensionMismatch {
                actual: actual_dims,
                baseline: baseline_dims,
                overlay,
            };
        }

        let mut diff_image = RgbaImage::new(actual_dims.width, actual_dims.height);
        let mut diff_pixel_count = 0usize;

        for ((a, b), out) in actual
            .pixels()
            .zip(baseline.pixels())
            .zip(diff_image.pixels_mut())
        {
            if self.pixel_differs(*a, *b) {
                diff_pixel_count += 1;
                *out = DIFF_COLOR;
            } else {
                *out = faded(*b);
            }
        }

        if diff_pixel_count == 0 {
            DiffOutcome::Identical {
                dimensions: actual_dims,
            }
        } else {
            DiffOutcome::Different {
                diff_pixel_count,
                total_pixels: actual_dims.pixel_count() as usize,
                diff_image,
            }
        }
    }

    /// Whether any channel moved by more than the threshold
    #[must_use]
    pub fn pixel_differs(&self, a: Rgba<u8>, b: Rgba<u8>) -> bool {
        a.0.iter()
            .zip(b.0.iter())
            .any(|(x, y)| f64::from(x.abs_diff(*y)) / 255.0 > self.threshold)
    }
}

/// Light grayscale rendition of an unchanged pixel
fn faded(pixel: Rgba<u8>) -> Rgba<u8> {
    let Rgba([r, g, b, _]) = pixel;
    let luma = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    // blend 10% of the luma over white
    let v = (255 - (255 - luma) / 10) as u8;
    Rgba([v, v, v, 255])
}

/// Decode PNG bytes into RGBA8
pub fn decode_png(bytes: &[u8], label: &str) -> InkcheckResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| InkcheckError::ImageDecode {
            message: format!("Failed to decode {label} image: {e}"),
        })
}

/// Encode an RGBA image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> InkcheckResult<Vec<u8>> {
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| InkcheckError::ImageEncode {
            message: format!("Failed to encode PNG: {e}"),
        })?;
    Ok(buffer)
}
