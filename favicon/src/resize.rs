use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

const FILTER: FilterType = FilterType::Lanczos3;

/// Largest size with the aspect ratio of `width`x`height` that fits into
/// `max_width`x`max_height`. Never larger than the input, never below 1px.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let fit_width = (width as f64 * scale).round() as u32;
    let fit_height = (height as f64 * scale).round() as u32;
    (
        fit_width.clamp(1, max_width.max(1)),
        fit_height.clamp(1, max_height.max(1)),
    )
}

pub fn direct(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(img, width, height, FILTER)
}

pub fn thumbnail(img: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    let (fit_width, fit_height) = fit_within(width, height, max_width, max_height);
    if (fit_width, fit_height) == (width, height) {
        return img.clone();
    }
    imageops::resize(img, fit_width, fit_height, FILTER)
}

pub fn padded(
    img: &RgbaImage,
    width: u32,
    height: u32,
    margin: u32,
    background: Rgba<u8>,
) -> RgbaImage {
    let inset = margin.saturating_mul(2);
    let inner = thumbnail(img, width.saturating_sub(inset), height.saturating_sub(inset));
    let mut canvas = RgbaImage::from_pixel(width, height, background);
    let (x, y) = centered(inner.dimensions(), (width, height));
    imageops::overlay(&mut canvas, &inner, x as i64, y as i64);
    canvas
}

fn centered((width, height): (u32, u32), (outer_width, outer_height): (u32, u32)) -> (u32, u32) {
    (
        outer_width.saturating_sub(width) / 2,
        outer_height.saturating_sub(height) / 2,
    )
}
