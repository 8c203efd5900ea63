use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader, RgbaImage};
use std::path::Path;

pub mod encode;
mod generate;
pub mod preset;
pub mod resize;
pub mod target;

pub use generate::{check_source, create_icons, generate, Outcome, Report};
pub use preset::Preset;
pub use target::{Target, TargetKind, TargetTable};

/// Pixels produced for a single target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rendered {
    Single(RgbaImage),
    /// One image per resolution of a container target, in declaration order.
    Frames(Vec<RgbaImage>),
}

/// Decoded source image. Shared read-only by all targets of a run.
pub struct Scaler {
    img: RgbaImage,
}

impl Scaler {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .with_context(|| format!("failed to read {}", path.display()))?
            .decode()
            .with_context(|| format!("failed to decode {}", path.display()))?;
        Ok(Self::from_image(img))
    }

    /// Converts the image to 8bit rgba so transparent padding behaves the
    /// same for every source format.
    pub fn from_image(img: DynamicImage) -> Self {
        tracing::debug!(
            "source is {}x{} {:?}",
            img.width(),
            img.height(),
            img.color()
        );
        let img = match img {
            DynamicImage::ImageRgba8(img) => img,
            img => {
                tracing::debug!("converting {:?} source to rgba8", img.color());
                img.to_rgba8()
            }
        };
        Self { img }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    /// Renders a fresh image for `kind`. The source is left untouched.
    pub fn render(&self, kind: &TargetKind) -> Result<Rendered> {
        kind.validate()?;
        Ok(match kind {
            TargetKind::Direct { width, height } => {
                Rendered::Single(resize::direct(&self.img, *width, *height))
            }
            TargetKind::Thumbnail { width, height } => {
                Rendered::Single(resize::thumbnail(&self.img, *width, *height))
            }
            TargetKind::Padded {
                width,
                height,
                margin,
                background,
            } => Rendered::Single(resize::padded(
                &self.img,
                *width,
                *height,
                *margin,
                *background,
            )),
            TargetKind::Container { sizes } => {
                let mut frames: Vec<RgbaImage> = Vec::with_capacity(sizes.len());
                for size in sizes {
                    let frame = resize::thumbnail(&self.img, *size, *size);
                    // Thumbnails never upscale, so small sources repeat frames.
                    if frames
                        .iter()
                        .any(|other| other.dimensions() == frame.dimensions())
                    {
                        tracing::debug!("skipping {}px frame of {:?}", size, frame.dimensions());
                        continue;
                    }
                    frames.push(frame);
                }
                Rendered::Frames(frames)
            }
        })
    }
}
