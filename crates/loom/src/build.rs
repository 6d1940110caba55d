use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::info;
use loom_core::{Bom, build_diagram};

use crate::input::{self, LoadedHarness};

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Write Graphviz diagrams and BOMs for harness files")]
pub struct BuildArgs {
    /// One or more harness YAML files
    #[arg(value_name = "FILES", required = true, value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Directory for the generated files (defaults to the current directory)
    #[arg(short, long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let loaded = input::load_all(&args.files)?;
    let out_dir = args.output.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for l in &loaded {
        write_harness(l, &out_dir)?;
    }

    if loaded.len() > 1 {
        let bom = input::shared_bom(&loaded)?;
        let path = out_dir.join("bom.tsv");
        write_bom(&bom, &path)?;
        info!("Wrote shared BOM of {} harnesses", loaded.len());
        eprintln!("{} {}", "Wrote".green(), path.display());
    }
    Ok(())
}

fn write_harness(l: &LoadedHarness, out_dir: &Path) -> Result<()> {
    let bom = Bom::from_harness(&l.harness)?;
    let diagram = build_diagram(&l.harness, Some(&bom))?;

    let gv = out_dir.join(format!("{}.gv", l.stem()));
    fs::write(&gv, diagram.to_dot()).with_context(|| format!("Failed to write {}", gv.display()))?;
    let tsv = out_dir.join(format!("{}.bom.tsv", l.stem()));
    write_bom(&bom, &tsv)?;

    eprintln!(
        "{} {}: {}, {}",
        "Built".green(),
        l.path.display(),
        gv.display(),
        tsv.display()
    );
    Ok(())
}

fn write_bom(bom: &Bom, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    bom.write_tsv(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))
}
