//! Presentation layer for polyllm
//!
//! This crate contains the CLI definition, output formatters, the console
//! presenter and progress reporters.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{AskArgs, Cli, Command, OutputFormatArg, RepairArgs};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use output::presenter::ConsolePresenter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
