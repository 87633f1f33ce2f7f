//! Image placement on generated pages.

use crate::config::FitMode;

/// Width of a generated A4 page in points.
pub const A4_WIDTH: f32 = 595.28;

/// Height of a generated A4 page in points.
pub const A4_HEIGHT: f32 = 841.89;

/// Rectangle an image is drawn into, in PDF points from the lower left
/// corner of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawConfig {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
}

impl DrawConfig {
    /// Place an image of `image` size (width, height) on a page of `page`
    /// size according to `fit`.
    ///
    /// The image's pixel size is its native size in points. Positions may be
    /// negative when the image overflows the page.
    pub fn compute(image: (f32, f32), page: (f32, f32), fit: FitMode) -> Self {
        let (iw, ih) = image;
        let (pw, ph) = page;

        match fit {
            FitMode::Center => Self {
                x: pw / 2.0 - iw / 2.0,
                y: ph / 2.0 - ih / 2.0,
                width: iw,
                height: ih,
            },
            FitMode::Stretch => Self {
                x: 0.0,
                y: 0.0,
                width: pw,
                height: ph,
            },
            FitMode::FitHeight => {
                let scale = ph / ih;
                let width = iw * scale;
                Self {
                    x: pw / 2.0 - width / 2.0,
                    y: 0.0,
                    width,
                    height: ph,
                }
            }
            FitMode::FitWidth => {
                let scale = pw / iw;
                let height = ih * scale;
                Self {
                    x: 0.0,
                    y: ph / 2.0 - height / 2.0,
                    width: pw,
                    height,
                }
            }
        }
    }

    /// Placement on a generated A4 page.
    pub fn on_a4(image: (f32, f32), fit: FitMode) -> Self {
        Self::compute(image, (A4_WIDTH, A4_HEIGHT), fit)
    }
}
