pub mod from_pydantic;
pub mod map;
pub mod normalize;
pub mod pydantic;
pub mod state;

pub use from_pydantic::{from_pydantic, FromPydanticArgs};
pub use map::{map, MapArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use pydantic::{pydantic, PydanticArgs};
pub use state::{state, StateArgs};

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where generated output goes
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (defaults to ./dist)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

impl OutputArgs {
    fn out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(self.out_dir.as_deref().unwrap_or("dist"))
    }
}

/// A file to process, with its path relative to the input root
pub struct Input {
    pub path: PathBuf,
    pub relative: PathBuf,
}

/// Expand `path` into every file with `extension` below it
pub fn find_inputs(path: &str, cwd: &str, extension: &str) -> Result<Vec<Input>> {
    let root = PathBuf::from(cwd).join(path);

    if root.is_file() {
        let relative = root.file_name().map(PathBuf::from).unwrap_or_else(|| root.clone());
        return Ok(vec![Input { path: root, relative }]);
    }
    if !root.is_dir() {
        return Err(anyhow!("Input path does not exist: {}", root.display()));
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(&root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file = entry.path();
        if file.extension().and_then(|s| s.to_str()) == Some(extension) {
            let relative = file.strip_prefix(&root).unwrap_or(file).to_path_buf();
            inputs.push(Input {
                path: file.to_path_buf(),
                relative,
            });
        }
    }

    Ok(inputs)
}

/// Print `output` or write it under the output directory, returning where it went
pub fn emit(output: &str, input: &Input, extension: &str, args: &OutputArgs, cwd: &str) -> Result<String> {
    if args.stdout {
        println!("{}", output);
        return Ok("stdout".to_string());
    }

    let output_file = output_path(&args.out_dir(cwd), &input.relative, extension);
    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_file, output)?;

    Ok(output_file.display().to_string())
}

fn output_path(out_dir: &Path, relative: &Path, extension: &str) -> PathBuf {
    out_dir.join(relative).with_extension(extension)
}

/// Run `process` over each input and print a per-file summary
pub fn run_batch<F>(inputs: &[Input], mut process: F) -> Result<()>
where
    F: FnMut(&Input) -> Result<String>,
{
    if inputs.is_empty() {
        println!("{}", "⚠️  No input files found".yellow());
        return Ok(());
    }

    let mut success_count = 0;
    let mut error_count = 0;

    for input in inputs {
        match process(input) {
            Ok(destination) => {
                success_count += 1;
                if destination != "stdout" {
                    println!("  {} {} → {}", "✓".green(), input.relative.display(), destination);
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    input.relative.display(),
                    e.to_string().red()
                );
            }
        }
    }

    if inputs.len() > 1 {
        println!();
        if error_count == 0 {
            println!("{} Processed {} files successfully", "✅".green(), success_count);
        } else {
            println!(
                "{} Processed {} files, {} errors",
                "⚠️".yellow(),
                success_count,
                error_count
            );
        }
    }

    if error_count > 0 {
        return Err(anyhow!("{} of {} files failed", error_count, inputs.len()));
    }
    Ok(())
}
