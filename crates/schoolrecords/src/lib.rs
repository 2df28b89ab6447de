//! `schoolrecords` - Student, teacher and mark records kept in flat JSON files
//!
//! This library provides the record store, search, dashboard figures,
//! export/import and the HTTP API behind the school records web application.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod exchange;
pub mod ids;
pub mod logging;
pub mod model;
pub mod search;
pub mod server;
pub mod storage;
pub mod validate;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{LetterGrade, Mark, Settings, Student, Teacher};
pub use storage::{SchoolDatabase, StoreStats};
