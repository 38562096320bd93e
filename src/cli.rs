use crate::config::{LayoutConfig, load_config};
use crate::ir::{Flow, load_flow};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "flowlane",
    version,
    about = "Compute level, lane and connector layouts for decision flows"
)]
pub struct Args {
    /// Flow file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Gap between level columns
    #[arg(long = "horizontalSpacing")]
    pub horizontal_spacing: Option<f32>,

    /// Gap between nodes stacked in one level
    #[arg(long = "verticalSpacing")]
    pub vertical_spacing: Option<f32>,

    /// Distance between lane center lines
    #[arg(long = "laneHeight")]
    pub lane_height: Option<f32>,

    /// Size of one anchor offset unit
    #[arg(long = "baseUnit")]
    pub base_unit: Option<f32>,

    /// Fail when the layout produced warnings
    #[arg(long = "strict")]
    pub strict: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);
    let flow = read_flow(args.input.as_deref())?;

    let layout = compute_layout(&flow, &config)?;
    for warning in &layout.warnings {
        eprintln!("warning: {warning}");
    }
    if args.strict && !layout.warnings.is_empty() {
        return Err(anyhow::anyhow!(
            "layout produced {} warning(s) in strict mode",
            layout.warnings.len()
        ));
    }

    write_layout_dump(args.output.as_deref(), &layout, &flow)
}

fn apply_overrides(mut config: LayoutConfig, args: &Args) -> LayoutConfig {
    if let Some(v) = args.horizontal_spacing {
        config.horizontal_spacing = v;
    }
    if let Some(v) = args.vertical_spacing {
        config.vertical_spacing = v;
    }
    if let Some(v) = args.lane_height {
        config.lane_height = v;
    }
    if let Some(v) = args.base_unit {
        config.base_unit = v;
    }
    config
}

fn read_flow(path: Option<&Path>) -> Result<Flow> {
    let input = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    load_flow(&input)
}
