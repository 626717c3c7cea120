use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use schemaforge_common::FileStore;
use schemaforge_editor::Workbench;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommand,
}

#[derive(Debug, Subcommand)]
pub enum StateCommand {
    /// List saved tabs
    List,

    /// Open a schema file as a new tab
    Import {
        /// Schema file to open
        file: String,
    },

    /// Print a tab's rendered schema
    Show {
        /// Tab index (defaults to the active tab)
        index: Option<usize>,
    },

    /// Close a tab
    Close {
        /// Tab index
        index: usize,
    },

    /// Forget every saved tab
    Clear,
}

pub fn state(args: StateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut store = FileStore::new(config.get_state_dir(cwd));
    let mut workbench = Workbench::load(&mut store, config.workbench_settings())?;

    match args.command {
        StateCommand::List => {
            print!("{}", list_tabs(&workbench));
        }
        StateCommand::Import { file } => {
            let source = fs::read_to_string(PathBuf::from(cwd).join(&file))?;
            workbench.add_tab();
            workbench.import_document(&source)?;
            workbench.save(&mut store)?;
            println!(
                "  {} {} → tab {}",
                "✓".green(),
                file,
                workbench.active_index()
            );
        }
        StateCommand::Show { index } => {
            let index = index.unwrap_or_else(|| workbench.active_index());
            let tab = workbench
                .tabs()
                .get(index)
                .ok_or_else(|| anyhow!("No tab at index {}", index))?;
            println!("{}", tab.document.rendered().to_pretty_string(config.indent));
        }
        StateCommand::Close { index } => {
            workbench.close_tab(index)?;
            workbench.save(&mut store)?;
            println!("  {} Closed tab {}", "✓".green(), index);
        }
        StateCommand::Clear => {
            workbench.reset(&mut store)?;
            println!("  {} Saved tabs cleared", "✓".green());
        }
    }

    Ok(())
}

fn list_tabs(workbench: &Workbench) -> String {
    let mut out = String::new();
    for (index, tab) in workbench.tabs().iter().enumerate() {
        let marker = if index == workbench.active_index() { "*" } else { " " };
        out.push_str(&format!("{} {}  {}\n", marker, index, tab.document.title()));
    }
    out
}
