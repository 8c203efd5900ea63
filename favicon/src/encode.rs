use crate::Rendered;
use anyhow::Result;
use ico::{IconDir, IconEntry};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{imageops, DynamicImage, ImageFormat, RgbImage, Rgba, RgbaImage};
use std::path::Path;

const JPEG_QUALITY: u8 = 95;
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Png,
    Ico,
    Jpeg,
}

impl OutputFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(match ImageFormat::from_path(path) {
            Ok(ImageFormat::Png) => Self::Png,
            Ok(ImageFormat::Ico) => Self::Ico,
            Ok(ImageFormat::Jpeg) => Self::Jpeg,
            _ => anyhow::bail!("unsupported output format for `{}`", path.display()),
        })
    }
}

pub fn encode(rendered: &Rendered, format: OutputFormat) -> Result<Vec<u8>> {
    match (rendered, format) {
        (Rendered::Single(img), OutputFormat::Png) => png(&optimize(img)),
        (Rendered::Single(img), OutputFormat::Jpeg) => jpeg(img),
        (Rendered::Single(img), OutputFormat::Ico) => icon(std::slice::from_ref(img)),
        (Rendered::Frames(frames), OutputFormat::Ico) => icon(frames),
        (Rendered::Frames(_), format) => {
            anyhow::bail!("{:?} can't hold multiple resolutions", format)
        }
    }
}

/// Picks the smallest lossless color type for the pixels.
pub fn optimize(img: &RgbaImage) -> DynamicImage {
    let mut is_grayscale = true;
    let mut is_opaque = true;
    for pixel in img.pixels() {
        if pixel[0] != pixel[1] || pixel[1] != pixel[2] {
            is_grayscale = false;
        }
        if pixel[3] != 255 {
            is_opaque = false;
        }
        if !is_grayscale && !is_opaque {
            break;
        }
    }
    let img = DynamicImage::ImageRgba8(img.clone());
    match (is_grayscale, is_opaque) {
        (true, true) => DynamicImage::ImageLuma8(img.to_luma8()),
        (true, false) => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        (false, true) => DynamicImage::ImageRgb8(img.to_rgb8()),
        (false, false) => img,
    }
}

pub fn png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = vec![];
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

fn jpeg(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = vec![];
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    DynamicImage::ImageRgb8(flatten(img, WHITE)).write_with_encoder(encoder)?;
    Ok(buf)
}

/// Composites `img` onto an opaque `background`, dropping the alpha channel.
fn flatten(img: &RgbaImage, background: Rgba<u8>) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), background);
    imageops::overlay(&mut canvas, img, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

// Frames are stored as 32bit rgba png, which every ico reader accepts.
fn icon(frames: &[RgbaImage]) -> Result<Vec<u8>> {
    let mut dir = IconDir::new();
    for frame in frames {
        let (width, height) = frame.dimensions();
        let data = png(&DynamicImage::ImageRgba8(frame.clone()))?;
        dir.add_entry(IconEntry::new(width, height, data)?);
    }
    let mut buf = vec![];
    dir.write(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgb};
    use std::io::Cursor;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn format_from_extension() -> Result<()> {
        assert_eq!(OutputFormat::from_path(Path::new("a.png"))?, OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.ICO"))?, OutputFormat::Ico);
        assert_eq!(OutputFormat::from_path(Path::new("a.jpg"))?, OutputFormat::Jpeg);
        assert!(OutputFormat::from_path(Path::new("a.txt")).is_err());
        assert!(OutputFormat::from_path(Path::new("favicon")).is_err());
        Ok(())
    }

    #[test]
    fn optimize_color_type() {
        let gray = RgbaImage::from_pixel(4, 4, Rgba([7, 7, 7, 255]));
        assert_eq!(optimize(&gray).color(), ColorType::L8);
        let gray_alpha = RgbaImage::from_pixel(4, 4, Rgba([7, 7, 7, 0]));
        assert_eq!(optimize(&gray_alpha).color(), ColorType::La8);
        let rgb = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        assert_eq!(optimize(&rgb).color(), ColorType::Rgb8);
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]));
        assert_eq!(optimize(&rgba).color(), ColorType::Rgba8);
    }

    #[test]
    fn encode_png_is_lossless() -> Result<()> {
        let img = RgbaImage::from_fn(8, 8, |x, y| Rgba([x as u8 * 30, y as u8 * 30, 9, 255]));
        let data = encode(&Rendered::Single(img.clone()), OutputFormat::Png)?;
        assert_eq!(&data[..8], &PNG_MAGIC);
        let decoded = image::load_from_memory_with_format(&data, ImageFormat::Png)?;
        assert_eq!(decoded.to_rgba8(), img);
        Ok(())
    }

    #[test]
    fn encode_jpeg() -> Result<()> {
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 128]));
        let data = encode(&Rendered::Single(img), OutputFormat::Jpeg)?;
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        Ok(())
    }

    #[test]
    fn flatten_transparent_onto_background() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let flat = flatten(&img, WHITE);
        assert_eq!(*flat.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([10, 20, 30]));
    }

    #[test]
    fn jpeg_transparency_is_white() -> Result<()> {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let data = encode(&Rendered::Single(img), OutputFormat::Jpeg)?;
        let decoded = image::load_from_memory_with_format(&data, ImageFormat::Jpeg)?.to_rgb8();
        assert!(decoded.pixels().all(|pixel| pixel.0.iter().all(|c| *c > 240)));
        Ok(())
    }

    #[test]
    fn encode_icon_frames() -> Result<()> {
        let frames = vec![
            RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 4])),
            RgbaImage::from_pixel(32, 32, Rgba([1, 2, 3, 4])),
        ];
        let data = encode(&Rendered::Frames(frames), OutputFormat::Ico)?;
        let dir = IconDir::read(&mut Cursor::new(data))?;
        let sizes: Vec<_> = dir.entries().iter().map(|e| (e.width, e.height)).collect();
        assert_eq!(sizes, [(16, 16), (32, 32)]);
        for entry in dir.entries() {
            let frame = image::load_from_memory_with_format(&entry.data, ImageFormat::Png)?;
            assert_eq!(frame.color(), ColorType::Rgba8);
            assert_eq!(frame.width(), entry.width);
        }
        Ok(())
    }

    #[test]
    fn frames_need_a_container() {
        let frames = vec![RgbaImage::new(16, 16)];
        assert!(encode(&Rendered::Frames(frames), OutputFormat::Png).is_err());
    }
}
