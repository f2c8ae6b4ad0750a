pub mod apply;
pub mod detect;
pub mod layers;
pub mod render;
pub mod variables;

pub use apply::{apply, ApplyArgs};
pub use detect::{detect, DetectArgs};
pub use layers::{layers, LayersArgs};
pub use render::{render, RenderArgs};
pub use variables::{variables, VariablesArgs};

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

/// Write to `out`, or stdout when there is none
fn emit(out: Option<&PathBuf>, content: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, content).with_context(|| format!("Cannot write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
