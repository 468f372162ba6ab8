use crate::catalog::normalize_catalog;
use crate::config::load_config;
use crate::layout_dump::{ViewDump, write_view_dump};
use crate::persist::{read_snapshot, write_snapshot};
use crate::view::GraphView;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "curriculum-tree", version, about = "Curriculum tree layout and filtering")]
pub struct Args {
    /// Catalog JSON file or '-' for stdin
    #[arg(short = 'i', long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Saved view state (collapsed ids, positions, filters)
    #[arg(short = 's', long = "state")]
    pub state: Option<PathBuf>,

    /// Write the resulting view state here
    #[arg(long = "saveState")]
    pub save_state: Option<PathBuf>,

    /// Config file (JSON5, camelCase keys)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Study program code
    #[arg(short = 'p', long = "program", default_value = "033 521")]
    pub program: String,

    /// Override the collapse state after loading
    #[arg(long = "collapse", value_enum)]
    pub collapse: Option<CollapseArg>,

    /// Output file for the layout dump. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CollapseArg {
    All,
    None,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.catalog.as_deref())?;
    let raw: serde_json::Value = serde_json::from_str(&input).context("catalog is not valid JSON")?;
    let catalog = normalize_catalog(&raw);
    log::info!("loaded catalog with {} exam subjects", catalog.subjects.len());

    let mut view = GraphView::new(catalog, &args.program, config);
    if let Some(path) = args.state.as_deref() {
        let snapshot = read_snapshot(path, &view.config().layout)
            .with_context(|| format!("failed to load state from {}", path.display()))?;
        view.apply_snapshot(&snapshot);
    }
    match args.collapse {
        Some(CollapseArg::All) => view.collapse_all(),
        Some(CollapseArg::None) => view.expand_all(),
        None => {}
    }

    match args.output.as_deref() {
        Some(path) => {
            write_view_dump(path, &view)?;
            log::info!("wrote layout dump to {}", path.display());
        }
        None => {
            let dump = ViewDump::from_view(&view);
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    if let Some(path) = args.save_state.as_deref() {
        write_snapshot(path, &view.snapshot())?;
        log::info!("saved view state to {}", path.display());
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
