use anyhow::{ensure, Result};
use image::Rgba;
use std::collections::HashSet;

/// How a target is derived from the source image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetKind {
    /// Scale to exactly `width`x`height`, ignoring the aspect ratio.
    Direct { width: u32, height: u32 },
    /// Shrink preserving the aspect ratio until it fits `width`x`height`.
    /// Never upscales.
    Thumbnail { width: u32, height: u32 },
    /// Shrink into the canvas minus `margin` on every side and center the
    /// result on an opaque `width`x`height` canvas filled with `background`.
    Padded {
        width: u32,
        height: u32,
        margin: u32,
        background: Rgba<u8>,
    },
    /// One square thumbnail per size, stored together in a single file.
    Container { sizes: Vec<u32> },
}

impl TargetKind {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Direct { width, height } | Self::Thumbnail { width, height } => {
                ensure!(
                    *width > 0 && *height > 0,
                    "invalid size {}x{}",
                    width,
                    height
                );
            }
            Self::Padded {
                width,
                height,
                margin,
                ..
            } => {
                ensure!(
                    margin.saturating_mul(2) < *width && margin.saturating_mul(2) < *height,
                    "margin {} leaves no room on a {}x{} canvas",
                    margin,
                    width,
                    height
                );
            }
            Self::Container { sizes } => {
                ensure!(!sizes.is_empty(), "container without sizes");
                for size in sizes {
                    ensure!(
                        (1..=ico::MAX_SIZE).contains(size),
                        "container size {} is outside 1..={}",
                        size,
                        ico::MAX_SIZE
                    );
                }
            }
        }
        Ok(())
    }
}

/// A single output file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    name: String,
    kind: TargetKind,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn direct(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(name, TargetKind::Direct { width, height })
    }

    pub fn thumbnail(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(name, TargetKind::Thumbnail { width, height })
    }

    pub fn padded(
        name: impl Into<String>,
        width: u32,
        height: u32,
        margin: u32,
        background: Rgba<u8>,
    ) -> Self {
        Self::new(
            name,
            TargetKind::Padded {
                width,
                height,
                margin,
                background,
            },
        )
    }

    pub fn container(name: impl Into<String>, sizes: &[u32]) -> Self {
        Self::new(
            name,
            TargetKind::Container {
                sizes: sizes.to_vec(),
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }
}

/// Ordered set of targets with unique file names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetTable {
    targets: Vec<Target>,
}

impl TargetTable {
    pub fn new(targets: Vec<Target>) -> Result<Self> {
        ensure!(!targets.is_empty(), "empty target table");
        let mut names = HashSet::with_capacity(targets.len());
        for target in &targets {
            let name = target.name();
            ensure!(is_file_name(name), "invalid target file name `{}`", name);
            ensure!(names.insert(name), "duplicate target `{}`", name);
        }
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(Target::name)
    }
}

fn is_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(&['/', '\\'][..]) && name != "." && name != ".."
}

impl<'a> IntoIterator for &'a TargetTable {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn keeps_declaration_order() -> Result<()> {
        let table = TargetTable::new(vec![
            Target::direct("b.png", 2, 2),
            Target::direct("a.png", 1, 1),
        ])?;
        assert_eq!(table.names().collect::<Vec<_>>(), ["b.png", "a.png"]);
        Ok(())
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = TargetTable::new(vec![
            Target::direct("icon.png", 16, 16),
            Target::thumbnail("icon.png", 32, 32),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate target `icon.png`"));
    }

    #[test]
    fn rejects_paths_as_names() {
        assert!(TargetTable::new(vec![Target::direct("../icon.png", 16, 16)]).is_err());
        assert!(TargetTable::new(vec![Target::direct("", 16, 16)]).is_err());
        assert!(TargetTable::new(vec![]).is_err());
    }

    #[test]
    fn validate_kinds() {
        assert!(TargetKind::Direct {
            width: 0,
            height: 16
        }
        .validate()
        .is_err());
        assert!(Target::padded("a.png", 40, 40, 20, WHITE)
            .kind()
            .validate()
            .is_err());
        assert!(Target::padded("a.png", 180, 180, 20, WHITE)
            .kind()
            .validate()
            .is_ok());
        assert!(Target::container("a.ico", &[]).kind().validate().is_err());
        assert!(Target::container("a.ico", &[16, 512])
            .kind()
            .validate()
            .is_err());
        assert!(Target::container("a.ico", &[16, 32, 48])
            .kind()
            .validate()
            .is_ok());
    }
}
