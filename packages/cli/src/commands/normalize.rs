use super::{emit, find_inputs, run_batch, Input, OutputArgs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use schemaforge_parser::{parse_document_str, serialize, IdGenerator, ParseWarning, SerializedDocument};
use std::fs;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Schema file or directory of .json files
    #[arg(default_value = ".")]
    pub path: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn normalize(args: NormalizeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let inputs = find_inputs(&args.path, cwd, "json")?;

    run_batch(&inputs, |input| {
        let rendered = render_file(input)?;
        emit(&rendered.to_pretty_string(config.indent), input, "schema.json", &args.output, cwd)
    })
}

/// Parse a schema file and render it back, reporting warnings on stderr
pub fn render_file(input: &Input) -> Result<SerializedDocument> {
    let source = fs::read_to_string(&input.path)?;
    let (rendered, warnings) = render(&source)?;
    for warning in &warnings {
        eprintln!("  {} {}: {}", "⚠".yellow(), input.relative.display(), warning);
    }
    Ok(rendered)
}

pub fn render(source: &str) -> Result<(SerializedDocument, Vec<ParseWarning>)> {
    let parsed = parse_document_str(source, IdGenerator::new())?;
    Ok((serialize(&parsed.value), parsed.warnings))
}
