use crate::encode::{self, OutputFormat};
use crate::target::{Target, TargetTable};
use crate::Scaler;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of generating a single target.
#[derive(Debug)]
pub enum Outcome {
    Created { name: String, path: PathBuf },
    Failed { name: String, error: anyhow::Error },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Created { name, .. } | Self::Failed { name, .. } => name,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Created { path, .. } => write!(f, "Created: {}", path.display()),
            Self::Failed { name, error } => write!(f, "Error creating {}: {:#}", name, error),
        }
    }
}

/// Outcomes of a run, in table order.
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn created(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_created())
    }

    pub fn failed(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_created())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Fails if the source image does not exist.
pub fn check_source(source: &Path) -> Result<()> {
    if !source.exists() {
        anyhow::bail!("Source logo not found at {}", source.display());
    }
    Ok(())
}

/// Loads `source` and generates every target of `table` into `out`.
///
/// A missing or undecodable source aborts before `out` is created.
pub fn create_icons(source: &Path, out: &Path, table: &TargetTable) -> Result<Report> {
    check_source(source)?;
    let scaler = Scaler::open(source)?;
    generate(&scaler, table, out, |_| {})
}

/// Generates every target of `table` into `out`, calling `progress` once per
/// target in table order.
///
/// Failures of individual targets are recorded in the report and do not stop
/// the run. Only failing to create `out` itself is returned as an error.
pub fn generate(
    scaler: &Scaler,
    table: &TargetTable,
    out: &Path,
    mut progress: impl FnMut(&Outcome),
) -> Result<Report> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let mut report = Report::default();
    for target in table {
        let now = Instant::now();
        let outcome = match create(scaler, target, out) {
            Ok(path) => Outcome::Created {
                name: target.name().to_string(),
                path,
            },
            Err(error) => {
                tracing::debug!("{} failed: {:#}", target.name(), error);
                Outcome::Failed {
                    name: target.name().to_string(),
                    error,
                }
            }
        };
        tracing::debug!("{} took {}ms", target.name(), now.elapsed().as_millis());
        progress(&outcome);
        report.outcomes.push(outcome);
    }
    Ok(report)
}

fn create(scaler: &Scaler, target: &Target, out: &Path) -> Result<PathBuf> {
    let path = out.join(target.name());
    let format = OutputFormat::from_path(&path)?;
    let rendered = scaler.render(target.kind())?;
    let bytes = encode::encode(&rendered, format)?;
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
