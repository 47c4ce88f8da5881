//! CLI entry point for iterative outpainting

use clap::Parser;
use outpainter::io::cli::{Cli, CommandRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let runner = CommandRunner::new(cli);
    match runner.process() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
