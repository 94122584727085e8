//! Taskflow CLI - Local-first task scheduling with dependency-aware timelines

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskflow_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
