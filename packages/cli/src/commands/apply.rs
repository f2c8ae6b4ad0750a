use crate::config::{load_site, Config};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagewright_components::SiteComponents;
use pagewright_editor::{Document, EditSession, MutationOutcome, NoopReason};
use pagewright_markup::Address;
use std::path::{Path, PathBuf};

use super::{emit, read};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document to patch
    pub document: PathBuf,

    /// File holding the framed patch response
    pub patch: PathBuf,

    /// Address of the element a modify patch replaces
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn apply(args: ApplyArgs, config: &Config, cwd: &Path) -> Result<()> {
    let source = read(&args.document)?;
    let raw = read(&args.patch)?;
    let site = load_site(config.components_path(cwd).as_deref())?;
    let target = args.target.as_deref().map(Address::new);

    let applied = apply_patch_text(&source, &raw, target.as_ref(), config, site)?;

    if let Some(message) = &applied.message {
        eprintln!("{} {}", "✓".green(), message);
    }
    emit(args.out.as_ref(), &applied.document)
}

#[derive(Debug)]
pub struct Applied {
    pub document: String,
    pub message: Option<String>,
}

/// Parse `raw` strictly and apply it, with inline copies of the site's
/// globals stripped afterwards
pub fn apply_patch_text(
    source: &str,
    raw: &str,
    target: Option<&Address>,
    config: &Config,
    site: SiteComponents,
) -> Result<Applied> {
    let mut session = EditSession::with_config(Document::from_source(source), config.editor.clone());
    session.set_site(site);

    let message = session.receive_response(raw)?.message.clone();
    match session.apply_pending(target)? {
        MutationOutcome::Applied { .. } => {}
        MutationOutcome::Noop {
            reason: NoopReason::Unchanged,
        } => eprintln!("{} patch leaves the document unchanged", "!".yellow()),
        MutationOutcome::Noop { reason } => return Err(anyhow!("Patch not applied: {}", reason)),
    }

    Ok(Applied {
        document: session.source().to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_components::{GlobalComponent, Position};

    const DOC: &str = r#"<body><header><nav><a href="/">Home</a><a href="/a">A</a><a href="/b">B</a></nav></header><section id="s1">Old</section></body>"#;

    #[test]
    fn test_apply_modify() {
        let raw = "MESSAGE: Reword\n---\nOPERATION: modify\n---\n<section id=\"s1\">New</section>";
        let applied = apply_patch_text(DOC, raw, None, &Config::default(), SiteComponents::new()).unwrap();

        assert_eq!(applied.message.as_deref(), Some("Reword"));
        assert!(applied.document.contains("<section id=\"s1\">New</section>"));
    }

    #[test]
    fn test_apply_strips_shadowed_header() {
        let site = SiteComponents::from_components(vec![GlobalComponent::new(
            "header-main",
            "Main",
            "<header>Site</header>",
            Position::Header,
        )
        .as_default()]);
        let raw = "MESSAGE: Reword\n---\nOPERATION: modify\n---\n<section id=\"s1\">New</section>";

        let applied = apply_patch_text(DOC, raw, None, &Config::default(), site).unwrap();
        assert!(!applied.document.contains("<header>"));
    }

    #[test]
    fn test_unframed_response_is_an_error() {
        let result = apply_patch_text(DOC, "I could not do that", None, &Config::default(), SiteComponents::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let raw = "MESSAGE: x\n---\nOPERATION: modify\n---\n<p>x</p>";
        let target = Address::new("body > aside");
        let result = apply_patch_text(DOC, raw, Some(&target), &Config::default(), SiteComponents::new());
        assert!(result.is_err());
    }
}
