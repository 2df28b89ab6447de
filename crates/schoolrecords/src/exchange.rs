//! Whole-school JSON export and import.
//!
//! A bundle carries every collection plus a format marker. Import either
//! replaces the collections wholesale or merges records by ID.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Mark, Settings, Student, Teacher};
use crate::storage::{files, SchoolDatabase};

/// Format marker written into every bundle.
pub const BUNDLE_FORMAT: &str = "school-records-v1";

/// Bundle schema version.
pub const BUNDLE_VERSION: u32 = 1;

/// A full export of the school's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    /// Always [`BUNDLE_FORMAT`].
    pub format: String,
    /// Schema version.
    pub version: u32,
    /// Version of the application that wrote the bundle.
    #[serde(default)]
    pub app_version: String,
    /// When the bundle was written.
    pub exported_at: DateTime<Utc>,
    /// School settings.
    #[serde(default)]
    pub settings: Option<Settings>,
    /// All students.
    #[serde(default)]
    pub students: Vec<Student>,
    /// All teachers.
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    /// All marks.
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl ExportBundle {
    /// Snapshot the database.
    #[must_use]
    pub fn from_db(db: &SchoolDatabase) -> Self {
        Self {
            format: BUNDLE_FORMAT.to_string(),
            version: BUNDLE_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            settings: Some(db.settings().clone()),
            students: db.students().to_vec(),
            teachers: db.teachers().to_vec(),
            marks: db.marks().to_vec(),
        }
    }

    /// Read a bundle from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a bundle.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no bundle at {}", path.display()),
            )));
        }
        files::read_json(path)?
            .ok_or_else(|| Error::validation("bundle", format!("{} is empty", path.display())))
    }

    /// Write the bundle to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        files::write_json(path, self, true)
    }

    /// Reject bundles from another format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedBundle`] on a format or version mismatch.
    pub fn check_format(&self) -> Result<()> {
        if self.format != BUNDLE_FORMAT || self.version > BUNDLE_VERSION {
            return Err(Error::UnsupportedBundle {
                format: format!("{} v{}", self.format, self.version),
            });
        }
        Ok(())
    }
}

/// How an import combines with existing records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Replace each collection with the bundle's copy.
    #[default]
    Replace,
    /// Upsert records by ID, keeping records the bundle does not mention.
    Merge,
}

/// Counts after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Students now stored.
    pub students: usize,
    /// Teachers now stored.
    pub teachers: usize,
    /// Marks now stored.
    pub marks: usize,
    /// Whether the settings record was replaced.
    pub settings_replaced: bool,
}

fn merge_by<T, K>(existing: &[T], incoming: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T>
where
    T: Clone,
    K: PartialEq,
{
    let mut merged = existing.to_vec();
    for record in incoming {
        match merged.iter().position(|r| key(r) == key(&record)) {
            Some(i) => merged[i] = record,
            None => merged.push(record),
        }
    }
    merged
}

/// Apply `bundle` to `db`.
///
/// Duplicate IDs inside any bundle collection, or an invalid settings
/// record, abort the import before anything is written.
///
/// # Errors
///
/// Returns [`Error::UnsupportedBundle`], [`Error::DuplicateId`],
/// [`Error::Validation`] for the settings, or a write error.
pub fn import(
    db: &mut SchoolDatabase,
    bundle: ExportBundle,
    mode: ImportMode,
) -> Result<ImportSummary> {
    bundle.check_format()?;

    let dup = |kind: &'static str, id: Option<String>| match id {
        Some(id) => Err(Error::DuplicateId { kind, id }),
        None => Ok(()),
    };
    dup(
        "student",
        crate::ids::find_duplicate(bundle.students.iter().map(|s| s.id.as_str())),
    )?;
    dup(
        "teacher",
        crate::ids::find_duplicate(bundle.teachers.iter().map(|t| t.id.as_str())),
    )?;
    dup(
        "mark",
        crate::ids::find_duplicate(bundle.marks.iter().map(|m| m.id.to_string())),
    )?;
    if let Some(settings) = &bundle.settings {
        crate::validate::settings(settings)?;
    }

    let ExportBundle {
        settings,
        students,
        teachers,
        marks,
        ..
    } = bundle;

    let (students, teachers, marks) = match mode {
        ImportMode::Replace => (students, teachers, marks),
        ImportMode::Merge => (
            merge_by(db.students(), students, |s| s.id.clone()),
            merge_by(db.teachers(), teachers, |t| t.id.clone()),
            merge_by(db.marks(), marks, |m| m.id),
        ),
    };

    db.replace_students(students)?;
    db.replace_teachers(teachers)?;
    db.replace_marks(marks)?;

    let settings_replaced = match settings {
        Some(settings) => {
            db.update_settings(settings)?;
            true
        }
        None => false,
    };

    let summary = ImportSummary {
        students: db.students().len(),
        teachers: db.teachers().len(),
        marks: db.marks().len(),
        settings_replaced,
    };
    info!(
        "Imported bundle ({:?}): {} students, {} teachers, {} marks",
        mode, summary.students, summary.teachers, summary.marks
    );
    Ok(summary)
}
