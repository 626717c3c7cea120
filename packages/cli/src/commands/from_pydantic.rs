use super::{emit, find_inputs, run_batch, OutputArgs};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use schemaforge_bridge::{Bridge, BridgeReply, PythonRuntime};
use schemaforge_parser::{parse_document, serialize, IdGenerator};
use std::fs;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct FromPydanticArgs {
    /// Python file or directory of .py files
    #[arg(default_value = ".")]
    pub path: String,

    /// Interpreter to run (overrides config)
    #[arg(long)]
    pub python: Option<String>,

    /// Seconds to wait for each conversion
    #[arg(long, default_value = "60")]
    pub timeout: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn from_pydantic(args: FromPydanticArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let inputs = find_inputs(&args.path, cwd, "py")?;
    if inputs.is_empty() {
        println!("{}", "⚠️  No .py files found".yellow());
        return Ok(());
    }

    let interpreter = args.python.clone().unwrap_or_else(|| config.python.clone());
    let runtime = PythonRuntime::new(interpreter).with_timeout(Duration::from_secs(args.timeout));
    let bridge = Bridge::new(runtime);

    let rt = tokio::runtime::Runtime::new()?;
    let mut progress = bridge.subscribe();
    let reporter = rt.spawn(async move {
        while progress.changed().await.is_ok() {
            let message = progress.borrow_and_update().clone();
            eprintln!("  {}", message.dimmed());
        }
    });

    let result = run_batch(&inputs, |input| {
        let code = fs::read_to_string(&input.path)?;
        let value = match rt.block_on(bridge.code_to_document(&code))? {
            BridgeReply::Document(value) => value,
            BridgeReply::Superseded => return Err(anyhow!("conversion was superseded")),
        };

        let parsed = parse_document(&value, IdGenerator::new())?;
        for warning in &parsed.warnings {
            eprintln!("  {} {}: {}", "⚠".yellow(), input.relative.display(), warning);
        }
        let rendered = serialize(&parsed.value);
        emit(&rendered.to_pretty_string(config.indent), input, "schema.json", &args.output, cwd)
    });

    reporter.abort();
    result
}
