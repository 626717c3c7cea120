use super::normalize::render_file;
use super::{emit, find_inputs, run_batch, OutputArgs};
use anyhow::Result;
use clap::Args;
use schemaforge_bridge::document_to_code;

#[derive(Debug, Args)]
pub struct PydanticArgs {
    /// Schema file or directory of .json files
    #[arg(default_value = ".")]
    pub path: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn pydantic(args: PydanticArgs, cwd: &str) -> Result<()> {
    let inputs = find_inputs(&args.path, cwd, "json")?;

    run_batch(&inputs, |input| {
        // normalize first so legacy keywords reach the generator in their current form
        let rendered = render_file(input)?;
        let code = document_to_code(&rendered.value);
        emit(&code, input, "py", &args.output, cwd)
    })
}
