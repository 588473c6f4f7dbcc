//! Rendering of sampled values into images, plus small bitmap helpers.

use crate::{
    color,
    grid::{Grid, Pixel, PixelValueMap},
    Size,
};
use image::{imageops, Rgb, RgbImage};

/// Color used for pixels that have no sampled value, and for padding.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Settings for rendering a phase portrait into an image.
pub struct Renderer {
    pub background: Rgb<u8>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer { background: WHITE }
    }
}

impl Renderer {
    /// Render sampled values into an image of the grid's size.
    ///
    /// Row 0 of the image is the top of the rectangle, i.e. the largest imaginary part.
    /// A pixel without a value is reported and left at the background color.
    pub fn render(&self, grid: &Grid, values: &PixelValueMap) -> RgbImage {
        let Size { width, height } = grid.size();
        let span = tracing::info_span!("render", width, height);
        let _guard = span.enter();

        let mut img = RgbImage::from_pixel(width as u32, height as u32, self.background);
        let mut holes = 0usize;
        for (i, j, out) in img.enumerate_pixels_mut() {
            let pixel = Pixel {
                x: i as usize,
                y: height - 1 - j as usize,
            };
            match values.get(&pixel) {
                Some(value) => *out = color::rgb(value),
                None => {
                    holes += 1;
                    tracing::warn!(
                        %pixel,
                        point = %grid.point(pixel),
                        "value at pixel was not computed"
                    );
                }
            }
        }
        if holes > 0 {
            tracing::info!(holes, "rendered with missing values");
        }
        img
    }
}

/// Grow every pixel into a `rate` x `rate` square.
pub fn magnify(img: &RgbImage, rate: u32) -> RgbImage {
    let rate = rate.max(1);
    RgbImage::from_fn(img.width() * rate, img.height() * rate, |x, y| {
        *img.get_pixel(x / rate, y / rate)
    })
}

/// Surround an image with white space.
pub fn add_margin(img: &RgbImage, left: u32, top: u32, right: u32, bottom: u32) -> RgbImage {
    let mut out = RgbImage::from_pixel(
        img.width() + left + right,
        img.height() + top + bottom,
        WHITE,
    );
    imageops::replace(&mut out, img, left.into(), top.into());
    out
}

/// Prepare an image for display in a `side` x `side` square.
///
/// Small images are first magnified by the largest integer rate that fits and centered;
/// non-square images are padded to a square. The result is then resampled to the exact size.
pub fn fit_square(img: &RgbImage, side: u32) -> RgbImage {
    let (width, height) = img.dimensions();
    let longest = width.max(height);
    let squared = if longest == 0 {
        img.clone()
    } else if longest < side {
        let rate = side / longest;
        let left = (side - rate * width) / 2;
        let right = side - left - rate * width;
        let top = (side - rate * height) / 2;
        let bottom = side - top - rate * height;
        add_margin(&magnify(img, rate), left, top, right, bottom)
    } else if width < height {
        let pad = (height - width) / 2;
        add_margin(img, pad, 0, pad, 0)
    } else if width > height {
        let pad = (width - height) / 2;
        add_margin(img, 0, pad, 0, pad)
    } else {
        img.clone()
    };
    imageops::resize(&squared, side, side, imageops::FilterType::Lanczos3)
}
