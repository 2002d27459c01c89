//! appgen CLI - Generate a project from a declarative app config

use anyhow::Result;
use appgen_core::GenerateArgs;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "appgen")]
#[command(about = "Generate a project from a declarative app config")]
#[command(version)]
pub struct Args {
    /// Path to the YAML app config (prompts, structure, packages, grunt tasks)
    pub config: PathBuf,

    /// Directory to generate the project into (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Answer every prompt with its default (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the bower/npm install phase after writing the project
    #[arg(long = "skip-install")]
    pub skip_install: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    let result = appgen_core::run(GenerateArgs {
        config: args.config,
        directory: args.directory,
        yes: args.yes,
        skip_install: args.skip_install,
    })
    .await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
