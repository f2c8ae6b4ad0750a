mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, detect, layers, render, variables, ApplyArgs, DetectArgs, LayersArgs, RenderArgs,
    VariablesArgs,
};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Pagewright CLI - apply patches and inspect pages from the terminal
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a generated patch to a document
    Apply(ApplyArgs),

    /// Detect inline headers and footers
    Detect(DetectArgs),

    /// Print the layer outline of a document
    Layers(LayersArgs),

    /// List the variable fields of a component fragment
    Variables(VariablesArgs),

    /// Render a page with the site's global components
    Render(RenderArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;
    let config = Config::load(&cwd)?;

    match cli.command {
        Command::Apply(args) => apply(args, &config, &cwd),
        Command::Detect(args) => detect(args, &config),
        Command::Layers(args) => layers(args),
        Command::Variables(args) => variables(args),
        Command::Render(args) => render(args, &config, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
