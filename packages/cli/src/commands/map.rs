use super::normalize::render_file;
use super::{emit, find_inputs, run_batch, OutputArgs};
use anyhow::Result;
use clap::Args;
use schemaforge_parser::IdentityMap;

#[derive(Debug, Args)]
pub struct MapArgs {
    /// Schema file or directory of .json files
    #[arg(default_value = ".")]
    pub path: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn map(args: MapArgs, cwd: &str) -> Result<()> {
    let inputs = find_inputs(&args.path, cwd, "json")?;

    run_batch(&inputs, |input| {
        let rendered = render_file(input)?;
        emit(&format_map(&rendered.identity_map), input, "map.txt", &args.output, cwd)
    })
}

/// One `path → id` line per rendered node, paths aligned
pub fn format_map(map: &IdentityMap) -> String {
    let width = map.keys().map(|path| display_path(path).len()).max().unwrap_or(0);
    map.iter()
        .map(|(path, id)| format!("{:<width$}  {}", display_path(path), id, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}
