//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::exchange::ImportMode;
use crate::search::{MarkQuery, StudentQuery, TeacherQuery};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Student commands.
#[derive(Debug, Subcommand)]
pub enum StudentsCommand {
    /// List students, optionally filtered
    List {
        /// Match against name or ID
        #[arg(long)]
        query: Option<String>,

        /// Only this grade level
        #[arg(short, long)]
        grade: Option<u8>,

        /// Only this section
        #[arg(short, long)]
        section: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one student's report card
    Show {
        /// Student ID
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete a student (their marks are kept)
    Delete {
        /// Student ID
        id: String,
    },
}

impl StudentsCommand {
    /// Search parameters for `list`, if this is a list command.
    #[must_use]
    pub fn query(&self) -> Option<StudentQuery> {
        match self {
            Self::List {
                query,
                grade,
                section,
                ..
            } => Some(StudentQuery {
                q: query.clone(),
                grade: *grade,
                section: section.clone(),
            }),
            _ => None,
        }
    }
}

/// Teacher commands.
#[derive(Debug, Subcommand)]
pub enum TeachersCommand {
    /// List teachers, optionally filtered
    List {
        /// Match against name or ID
        #[arg(long)]
        query: Option<String>,

        /// Only this department
        #[arg(short, long)]
        department: Option<String>,

        /// Only this subject
        #[arg(short, long)]
        subject: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

impl TeachersCommand {
    /// Search parameters for this command.
    #[must_use]
    pub fn query(&self) -> TeacherQuery {
        match self {
            Self::List {
                query,
                department,
                subject,
                ..
            } => TeacherQuery {
                q: query.clone(),
                department: department.clone(),
                subject: subject.clone(),
            },
        }
    }
}

/// Mark commands.
#[derive(Debug, Subcommand)]
pub enum MarksCommand {
    /// List marks, optionally filtered
    List {
        /// Only this student ID
        #[arg(long)]
        student: Option<String>,

        /// Only this subject
        #[arg(short, long)]
        subject: Option<String>,

        /// Only this term
        #[arg(short, long)]
        term: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

impl MarksCommand {
    /// Filter parameters for this command.
    #[must_use]
    pub fn query(&self) -> MarkQuery {
        match self {
            Self::List {
                student,
                subject,
                term,
                ..
            } => MarkQuery {
                student_id: student.clone(),
                subject: subject.clone(),
                term: term.clone(),
            },
        }
    }
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write the bundle here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Bundle file produced by `export`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Merge records by ID instead of replacing collections
    #[arg(short, long)]
    pub merge: bool,
}

impl ImportCommand {
    /// Import mode selected by the flags.
    #[must_use]
    pub fn mode(&self) -> ImportMode {
        if self.merge {
            ImportMode::Merge
        } else {
            ImportMode::Replace
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per record
    Plain,
    /// Aligned columns with a header
    #[default]
    Table,
    /// JSON array
    Json,
}
