use crate::config::{load_site, Config};
use anyhow::Result;
use clap::Args;
use pagewright_components::SiteComponents;
use pagewright_editor::{Document, EditSession};
use std::path::{Path, PathBuf};

use super::{emit, read};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document to render
    pub document: PathBuf,

    /// JSON list of global components (overrides `componentsFile`)
    #[arg(short, long)]
    pub components: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn render(args: RenderArgs, config: &Config, cwd: &Path) -> Result<()> {
    let source = read(&args.document)?;
    let components = args.components.or_else(|| config.components_path(cwd));
    let site = load_site(components.as_deref())?;

    emit(args.out.as_ref(), &render_source(&source, site, config)?)
}

/// The page with the site's default globals in place of inline copies
pub fn render_source(source: &str, site: SiteComponents, config: &Config) -> Result<String> {
    let mut session = EditSession::with_config(Document::from_source(source), config.editor.clone());
    session.set_site(site);
    Ok(session.render()?)
}
