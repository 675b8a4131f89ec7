//! Background Removal CLI Tool
//!
//! Removes the background of a single image, trying the neural primary
//! remover first and falling back to colour-distance segmentation.

#[cfg(feature = "cli")]
use remove_bg::cli;
use std::process::ExitCode;

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() -> ExitCode {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    ExitCode::FAILURE
}
