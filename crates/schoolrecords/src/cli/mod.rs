//! Command-line interface for schoolrecords.
//!
//! This module provides the CLI structure and command handlers for the
//! `schoolrec` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, ImportCommand, MarksCommand, OutputFormat, ServeCommand,
    StatusCommand, StudentsCommand, TeachersCommand,
};

/// schoolrec - Keep student, teacher and mark records
///
/// Serves the school records web application and manages the JSON
/// collection files it stores its data in.
#[derive(Debug, Parser)]
#[command(name = "schoolrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Show data directory, record counts and dashboard figures
    Status(StatusCommand),

    /// List, show or delete students
    #[command(subcommand)]
    Students(StudentsCommand),

    /// List teachers
    #[command(subcommand)]
    Teachers(TeachersCommand),

    /// List marks
    #[command(subcommand)]
    Marks(MarksCommand),

    /// Export every collection as one JSON bundle
    Export(ExportCommand),

    /// Import a JSON bundle
    Import(ImportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
