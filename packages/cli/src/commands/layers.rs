use anyhow::Result;
use clap::Args;
use pagewright_editor::{build_layers, outline};
use pagewright_markup::parse;
use std::path::PathBuf;

use super::read;

#[derive(Args, Debug)]
pub struct LayersArgs {
    /// Document to outline
    pub document: PathBuf,
}

pub fn layers(args: LayersArgs) -> Result<()> {
    let source = read(&args.document)?;
    print!("{}", outline(&build_layers(&parse(&source))));
    Ok(())
}
