use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::input;

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum BomFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFormat::Table => write!(f, "table"),
            BomFormat::Tsv => write!(f, "tsv"),
            BomFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Print the Bill of Materials (BOM) of one or more harnesses")]
pub struct BomArgs {
    /// Harness YAML files, merged into one BOM in the given order
    #[arg(value_name = "FILES", required = true, value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value_t = BomFormat::Table)]
    pub format: BomFormat,
}

pub fn execute(args: BomArgs) -> Result<()> {
    let loaded = input::load_all(&args.files)?;
    let bom = input::shared_bom(&loaded)?;

    let mut writer = io::stdout().lock();
    match args.format {
        BomFormat::Table => bom.write_table(&mut writer)?,
        BomFormat::Tsv => bom.write_tsv(&mut writer)?,
        BomFormat::Json => writeln!(writer, "{}", bom.to_json()?)?,
    };

    Ok(())
}
