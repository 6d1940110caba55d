use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use loom_core::{Bom, Harness, HarnessDocument};
use rayon::prelude::*;

/// A finalized harness and the file it was read from.
pub struct LoadedHarness {
    pub path: PathBuf,
    pub harness: Harness,
}

impl LoadedHarness {
    /// Output file stem, also used as the harness name.
    pub fn stem(&self) -> &str {
        self.harness.name()
    }
}

fn harness_name(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

pub fn load(path: &Path) -> Result<LoadedHarness> {
    debug!("Loading harness file: {}", path.display());
    let name = harness_name(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: HarnessDocument = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let harness = document
        .into_harness(&name)
        .with_context(|| format!("Invalid harness in {}", path.display()))?;
    Ok(LoadedHarness {
        path: path.to_path_buf(),
        harness,
    })
}

/// Load every file in parallel. The result keeps command-line order.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<LoadedHarness>> {
    let loaded: Vec<LoadedHarness> = paths
        .par_iter()
        .map(|p| load(p))
        .collect::<Result<_>>()?;

    for (i, a) in loaded.iter().enumerate() {
        if let Some(b) = loaded[..i].iter().find(|b| b.stem() == a.stem()) {
            bail!(
                "{} and {} would both be named '{}'",
                b.path.display(),
                a.path.display(),
                a.stem()
            );
        }
    }
    Ok(loaded)
}

/// One BOM over all harnesses, fed in order so IDs are reproducible.
pub fn shared_bom(loaded: &[LoadedHarness]) -> Result<Bom> {
    let mut bom = Bom::new();
    for l in loaded {
        bom.add_harness(&l.harness)
            .with_context(|| format!("Failed to collect BOM of {}", l.path.display()))?;
    }
    bom.finalize();
    Ok(bom)
}
