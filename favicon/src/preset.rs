use crate::target::{Target, TargetTable};
use anyhow::Result;
use image::Rgba;
use std::path::Path;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Apple touch icons are rendered on an opaque canvas with this much
/// padding on every side.
pub const TOUCH_ICON_MARGIN: u32 = 20;

/// The fixed icon sets that can be generated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Preset {
    /// Favicons, touch icon and a multi-resolution `favicon.ico` from a
    /// transparent logo.
    #[default]
    Favicons,
    /// Site logo and icons scaled to exact sizes.
    Logos,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Self::Favicons, Self::Logos];

    pub fn targets(self) -> Result<TargetTable> {
        let targets = match self {
            Self::Favicons => vec![
                Target::container("favicon.ico", &[16, 32, 48]),
                Target::thumbnail("favicon-16x16.png", 16, 16),
                Target::thumbnail("favicon-32x32.png", 32, 32),
                Target::padded("apple-touch-icon.png", 180, 180, TOUCH_ICON_MARGIN, WHITE),
                Target::thumbnail("favicon-192x192.png", 192, 192),
                Target::thumbnail("favicon-512x512.png", 512, 512),
            ],
            Self::Logos => vec![
                Target::direct("logo.png", 512, 512),
                Target::direct("favicon-32x32.png", 32, 32),
                Target::direct("favicon-16x16.png", 16, 16),
                Target::direct("apple-touch-icon.png", 180, 180),
                Target::direct("favicon-192x192.png", 192, 192),
                Target::direct("favicon-512x512.png", 512, 512),
            ],
        };
        TargetTable::new(targets)
    }

    /// Source image, relative to the project root.
    pub fn default_source(self) -> &'static Path {
        match self {
            Self::Favicons => Path::new("docs/images/logo-removebg-preview.png"),
            Self::Logos => Path::new("images/logo.jpg"),
        }
    }

    /// Output directory, relative to the project root.
    pub fn default_output(self) -> &'static Path {
        match self {
            Self::Favicons => Path::new("docs/images"),
            Self::Logos => Path::new("images"),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Favicons => write!(f, "favicons"),
            Self::Logos => write!(f, "logos"),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(preset: &str) -> Result<Self> {
        Ok(match preset {
            "favicons" => Self::Favicons,
            "logos" => Self::Logos,
            _ => anyhow::bail!("unsupported preset {}", preset),
        })
    }
}
