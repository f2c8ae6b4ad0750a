use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_components::{extract_variables, VariableField};
use std::fmt::Write;
use std::path::PathBuf;

use super::{read, OutputFormat};

#[derive(Args, Debug)]
pub struct VariablesArgs {
    /// Component fragment to inspect
    pub fragment: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

pub fn variables(args: VariablesArgs) -> Result<()> {
    let fragment = read(&args.fragment)?;
    let fields = extract_variables(&fragment);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fields)?),
        OutputFormat::Text => print!("{}", report(&fields)),
    }
    Ok(())
}

fn report(fields: &[VariableField]) -> String {
    if fields.is_empty() {
        return format!("{}\n", "No variable fields".yellow());
    }

    let mut out = String::new();
    for field in fields {
        let location = match &field.attribute {
            Some(attribute) => format!("{} [{}]", field.selector, attribute),
            None => field.selector.to_string(),
        };
        let _ = writeln!(out, "{:<16} {:<32} {:?}", field.name.bold(), location, field.default_value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_report() {
        colored::control::set_override(false);
        let fields = extract_variables(r#"<div><h2>Title</h2><img src="a.png" alt="A"></div>"#);
        let text = report(&fields);
        assert_eq!(text.lines().count(), fields.len());
        assert!(text.contains("\"Title\""));
    }

    #[test]
    fn test_empty_report() {
        colored::control::set_override(false);
        assert_eq!(report(&[]), "No variable fields\n");
    }
}
