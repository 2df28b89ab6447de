//! Storage layer for schoolrecords.
//!
//! This module provides the data-access layer: one in-memory array per
//! record collection, mirrored to one JSON file per collection in the data
//! directory. Every mutation rewrites the entire file for the collection it
//! touched.

pub mod collection;
pub mod files;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ids;
use crate::model::{Mark, Settings, Student, Teacher};
use crate::validate;

pub use collection::Collection;

/// Options that shape how a [`SchoolDatabase`] reads and writes files.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Indent collection files.
    pub pretty_json: bool,
    /// Settings used while no settings file exists.
    pub default_settings: Settings,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            pretty_json: true,
            default_settings: Settings::from(&crate::config::SchoolConfig::default()),
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            pretty_json: config.storage.pretty_json,
            default_settings: Settings::from(&config.school),
        }
    }
}

/// Data-access layer over the four record collections.
///
/// Provides:
/// - Full-collection reads
/// - Inserts with sequential ID allocation
/// - Full-record replacement keyed by ID
/// - Deletes by filtering the collection
/// - A whole-file write after every mutation
#[derive(Debug)]
pub struct SchoolDatabase {
    /// Directory holding the collection files.
    root: PathBuf,
    options: StoreOptions,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    marks: Vec<Mark>,
    settings: Settings,
}

impl SchoolDatabase {
    /// Open or create a database in `root` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a collection
    /// file is malformed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(root, StoreOptions::default())
    }

    /// Open the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a collection
    /// file is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open_with(config.data_dir(), StoreOptions::from(config))
    }

    /// Open or create a database in `root`.
    ///
    /// Missing collection files are treated as empty collections; they are
    /// created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a collection
    /// file is malformed.
    pub fn open_with(root: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        files::ensure_dir(&root)?;

        let mut db = Self {
            settings: options.default_settings.clone(),
            root,
            options,
            students: Vec::new(),
            teachers: Vec::new(),
            marks: Vec::new(),
        };
        db.reload()?;

        info!(
            "Opened school records at {} ({} students, {} teachers, {} marks)",
            db.root.display(),
            db.students.len(),
            db.teachers.len(),
            db.marks.len()
        );
        Ok(db)
    }

    /// Directory holding the collection files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether collection files are written indented.
    #[must_use]
    pub fn pretty_json(&self) -> bool {
        self.options.pretty_json
    }

    /// Path of a collection's file.
    #[must_use]
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    /// Re-read every collection from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if any collection file is malformed.
    pub fn reload(&mut self) -> Result<()> {
        for collection in Collection::ALL {
            self.reload_collection(collection)?;
        }
        Ok(())
    }

    /// Re-read one collection from disk, replacing the cached copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection file is malformed.
    pub fn reload_collection(&mut self, collection: Collection) -> Result<()> {
        let path = self.collection_path(collection);
        match collection {
            Collection::Students => self.students = load_list(&path)?,
            Collection::Teachers => self.teachers = load_list(&path)?,
            Collection::Marks => self.marks = load_list(&path)?,
            Collection::Settings => {
                self.settings = files::read_json(&path)?
                    .unwrap_or_else(|| self.options.default_settings.clone());
            }
        }
        debug!("Loaded {} from {}", collection, path.display());
        Ok(())
    }

    // === Students ===

    /// All students in stored order.
    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Look up a student by ID.
    #[must_use]
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Insert a student, assigning the next `S{grade}NNN` ID.
    ///
    /// Any ID on the input is ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a write error.
    pub fn add_student(&mut self, mut student: Student) -> Result<Student> {
        validate::student(&student)?;
        student.id = ids::next_student_id(&self.students, student.grade)?;

        let mut next = self.students.clone();
        next.push(student.clone());
        self.commit_students(next)?;

        info!("Added student {} ({})", student.id, student.name);
        Ok(student)
    }

    /// Replace the student with `id`. The stored ID is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], a validation error, or a write error.
    pub fn update_student(&mut self, id: &str, mut student: Student) -> Result<Student> {
        let index = self
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::not_found("student", id))?;
        validate::student(&student)?;
        student.id = id.to_string();

        let mut next = self.students.clone();
        next[index] = student.clone();
        self.commit_students(next)?;

        info!("Updated student {}", id);
        Ok(student)
    }

    /// Delete the student with `id`. Their marks are left in place.
    ///
    /// Returns `true` if a student was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn delete_student(&mut self, id: &str) -> Result<bool> {
        let next: Vec<Student> = self
            .students
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        if next.len() == self.students.len() {
            return Ok(false);
        }
        self.commit_students(next)?;
        info!("Deleted student {}", id);
        Ok(true)
    }

    /// Replace the whole student collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] or a write error.
    pub fn replace_students(&mut self, students: Vec<Student>) -> Result<()> {
        if let Some(id) = ids::find_duplicate(students.iter().map(|s| s.id.as_str())) {
            return Err(Error::DuplicateId {
                kind: "student",
                id,
            });
        }
        self.commit_students(students)
    }

    fn commit_students(&mut self, next: Vec<Student>) -> Result<()> {
        self.write_collection(Collection::Students, &next)?;
        self.students = next;
        Ok(())
    }

    // === Teachers ===

    /// All teachers in stored order.
    #[must_use]
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// Look up a teacher by ID.
    #[must_use]
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Insert a teacher, assigning the next `TNNN` ID.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a write error.
    pub fn add_teacher(&mut self, mut teacher: Teacher) -> Result<Teacher> {
        validate::teacher(&teacher)?;
        teacher.id = ids::next_teacher_id(&self.teachers)?;

        let mut next = self.teachers.clone();
        next.push(teacher.clone());
        self.commit_teachers(next)?;

        info!("Added teacher {} ({})", teacher.id, teacher.name);
        Ok(teacher)
    }

    /// Replace the teacher with `id`. The stored ID is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], a validation error, or a write error.
    pub fn update_teacher(&mut self, id: &str, mut teacher: Teacher) -> Result<Teacher> {
        let index = self
            .teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::not_found("teacher", id))?;
        validate::teacher(&teacher)?;
        teacher.id = id.to_string();

        let mut next = self.teachers.clone();
        next[index] = teacher.clone();
        self.commit_teachers(next)?;

        info!("Updated teacher {}", id);
        Ok(teacher)
    }

    /// Delete the teacher with `id`.
    ///
    /// Returns `true` if a teacher was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn delete_teacher(&mut self, id: &str) -> Result<bool> {
        let next: Vec<Teacher> = self
            .teachers
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        if next.len() == self.teachers.len() {
            return Ok(false);
        }
        self.commit_teachers(next)?;
        info!("Deleted teacher {}", id);
        Ok(true)
    }

    /// Replace the whole teacher collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] or a write error.
    pub fn replace_teachers(&mut self, teachers: Vec<Teacher>) -> Result<()> {
        if let Some(id) = ids::find_duplicate(teachers.iter().map(|t| t.id.as_str())) {
            return Err(Error::DuplicateId {
                kind: "teacher",
                id,
            });
        }
        self.commit_teachers(teachers)
    }

    fn commit_teachers(&mut self, next: Vec<Teacher>) -> Result<()> {
        self.write_collection(Collection::Teachers, &next)?;
        self.teachers = next;
        Ok(())
    }

    // === Marks ===

    /// All marks in stored order.
    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Look up a mark by ID.
    #[must_use]
    pub fn mark(&self, id: u64) -> Option<&Mark> {
        self.marks.iter().find(|m| m.id == id)
    }

    /// All marks recorded for one student.
    #[must_use]
    pub fn marks_for_student(&self, student_id: &str) -> Vec<&Mark> {
        self.marks
            .iter()
            .filter(|m| m.student_id == student_id)
            .collect()
    }

    /// Insert a mark, assigning the next numeric ID and its letter grade.
    ///
    /// The student reference is not enforced; an unknown student is logged.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a write error.
    pub fn add_mark(&mut self, mut mark: Mark) -> Result<Mark> {
        validate::mark(&mark)?;
        if self.student(&mark.student_id).is_none() {
            warn!("Recording mark for unknown student {}", mark.student_id);
        }
        mark.id = ids::next_mark_id(&self.marks)?;
        mark.regrade();

        let mut next = self.marks.clone();
        next.push(mark.clone());
        self.commit_marks(next)?;

        info!("Added mark {} for student {}", mark.id, mark.student_id);
        Ok(mark)
    }

    /// Replace the mark with `id`. The stored ID is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], a validation error, or a write error.
    pub fn update_mark(&mut self, id: u64, mut mark: Mark) -> Result<Mark> {
        let index = self
            .marks
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::not_found("mark", id.to_string()))?;
        validate::mark(&mark)?;
        mark.id = id;
        mark.regrade();

        let mut next = self.marks.clone();
        next[index] = mark.clone();
        self.commit_marks(next)?;

        info!("Updated mark {}", id);
        Ok(mark)
    }

    /// Delete the mark with `id`.
    ///
    /// Returns `true` if a mark was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn delete_mark(&mut self, id: u64) -> Result<bool> {
        let next: Vec<Mark> = self.marks.iter().filter(|m| m.id != id).cloned().collect();
        if next.len() == self.marks.len() {
            return Ok(false);
        }
        self.commit_marks(next)?;
        info!("Deleted mark {}", id);
        Ok(true)
    }

    /// Replace the whole mark collection. Letter grades are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] or a write error.
    pub fn replace_marks(&mut self, mut marks: Vec<Mark>) -> Result<()> {
        if let Some(id) = ids::find_duplicate(marks.iter().map(|m| m.id.to_string())) {
            return Err(Error::DuplicateId { kind: "mark", id });
        }
        marks.iter_mut().for_each(Mark::regrade);
        self.commit_marks(marks)
    }

    fn commit_marks(&mut self, next: Vec<Mark>) -> Result<()> {
        self.write_collection(Collection::Marks, &next)?;
        self.marks = next;
        Ok(())
    }

    // === Settings ===

    /// The school settings record.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings record.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a write error.
    pub fn update_settings(&mut self, settings: Settings) -> Result<Settings> {
        validate::settings(&settings)?;
        self.write_collection(Collection::Settings, &settings)?;
        self.settings = settings.clone();
        info!("Updated school settings");
        Ok(settings)
    }

    // === Raw file save ===

    /// Write a JSON document to `relative` under the data directory.
    ///
    /// When the target is one of the collection files, the document must
    /// parse as that collection; the cache is then refreshed from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathOutsideRoot`], a validation error if a
    /// collection file receives the wrong shape, or a write error.
    pub fn save_file(&mut self, relative: &str, value: &serde_json::Value) -> Result<PathBuf> {
        let target = files::resolve_within(&self.root, relative)?;
        let collection = if target.parent() == Some(self.root.as_path()) {
            target
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(Collection::from_file_name)
        } else {
            None
        };

        if let Some(collection) = collection {
            self.check_collection_shape(collection, value)?;
        }

        let path = files::save_file(&self.root, relative, value, self.options.pretty_json)?;
        info!("Saved {}", path.display());

        if let Some(collection) = collection {
            self.reload_collection(collection)?;
        }
        Ok(path)
    }

    fn check_collection_shape(&self, collection: Collection, value: &serde_json::Value) -> Result<()> {
        let shape_err = |e: serde_json::Error| {
            Error::validation("data", format!("not a valid {collection} document: {e}"))
        };
        match collection {
            Collection::Students => {
                let list: Vec<Student> = serde_json::from_value(value.clone()).map_err(shape_err)?;
                reject_duplicates("student", list.iter().map(|s| s.id.as_str()))
            }
            Collection::Teachers => {
                let list: Vec<Teacher> = serde_json::from_value(value.clone()).map_err(shape_err)?;
                reject_duplicates("teacher", list.iter().map(|t| t.id.as_str()))
            }
            Collection::Marks => {
                let list: Vec<Mark> = serde_json::from_value(value.clone()).map_err(shape_err)?;
                reject_duplicates("mark", list.iter().map(|m| m.id.to_string()))
            }
            Collection::Settings => {
                let _: Settings = serde_json::from_value(value.clone()).map_err(shape_err)?;
                Ok(())
            }
        }
    }

    fn write_collection<T: serde::Serialize + ?Sized>(
        &self,
        collection: Collection,
        value: &T,
    ) -> Result<()> {
        files::write_json(
            &self.collection_path(collection),
            value,
            self.options.pretty_json,
        )
    }

    /// Get storage statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let disk_bytes = Collection::ALL
            .iter()
            .filter_map(|c| std::fs::metadata(self.collection_path(*c)).ok())
            .map(|m| m.len())
            .sum();

        StoreStats {
            students: self.students.len(),
            teachers: self.teachers.len(),
            marks: self.marks.len(),
            disk_bytes,
        }
    }
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    Ok(files::read_json(path)?.unwrap_or_default())
}

fn reject_duplicates<I, S>(kind: &'static str, ids: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match ids::find_duplicate(ids) {
        Some(id) => Err(Error::DuplicateId { kind, id }),
        None => Ok(()),
    }
}

/// Record counts and on-disk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Number of students.
    pub students: usize,
    /// Number of teachers.
    pub teachers: usize,
    /// Number of marks.
    pub marks: usize,
    /// Combined size of the collection files in bytes.
    pub disk_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, SchoolDatabase) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = SchoolDatabase::open(dir.path()).expect("open db");
        (dir, db)
    }

    #[test]
    fn test_open_empty_dir() {
        let (_dir, db) = create_test_db();
        assert!(db.students().is_empty());
        assert!(db.teachers().is_empty());
        assert!(db.marks().is_empty());
        assert_eq!(db.settings().school_name, "My School");
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/data");
        let db = SchoolDatabase::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(db.root(), nested);
    }

    #[test]
    fn test_open_malformed_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("teachers.json"), "{not json").unwrap();

        let err = SchoolDatabase::open(dir.path()).unwrap_err();
        assert!(matches!(err, Error::CollectionLoad { .. }));
    }

    #[test]
    fn test_add_student_assigns_ids_and_persists() {
        let (dir, mut db) = create_test_db();

        let a = db.add_student(fixtures::student("Ada", 1)).unwrap();
        let b = db.add_student(fixtures::student("Bea", 1)).unwrap();
        let c = db.add_student(fixtures::student("Cal", 2)).unwrap();

        assert_eq!(a.id, "S1001");
        assert_eq!(b.id, "S1002");
        assert_eq!(c.id, "S2001");

        let reopened = SchoolDatabase::open(dir.path()).unwrap();
        assert_eq!(reopened.students().len(), 3);
        assert_eq!(reopened.student("S1002").unwrap().name, "Bea");
    }

    #[test]
    fn test_add_student_ignores_supplied_id() {
        let (_dir, mut db) = create_test_db();
        let mut input = fixtures::student("Ada", 3);
        input.id = "HACKED".to_string();

        let saved = db.add_student(input).unwrap();
        assert_eq!(saved.id, "S3001");
    }

    #[test]
    fn test_add_invalid_student_writes_nothing() {
        let (dir, mut db) = create_test_db();
        let err = db.add_student(fixtures::student("", 3)).unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert!(db.students().is_empty());
        assert!(!dir.path().join("students.json").exists());
    }

    #[test]
    fn test_deleted_id_not_reused_below_max() {
        let (_dir, mut db) = create_test_db();
        db.add_student(fixtures::student("Ada", 1)).unwrap();
        db.add_student(fixtures::student("Bea", 1)).unwrap();

        assert!(db.delete_student("S1001").unwrap());
        let next = db.add_student(fixtures::student("Cal", 1)).unwrap();
        assert_eq!(next.id, "S1003");
    }

    #[test]
    fn test_update_student_keeps_id() {
        let (_dir, mut db) = create_test_db();
        let saved = db.add_student(fixtures::student("Ada", 1)).unwrap();

        let mut edited = saved.clone();
        edited.name = "Ada King".to_string();
        edited.grade = 2;
        edited.id = "S9999".to_string();

        let updated = db.update_student(&saved.id, edited).unwrap();
        assert_eq!(updated.id, "S1001");
        assert_eq!(db.student("S1001").unwrap().name, "Ada King");
        assert_eq!(db.student("S1001").unwrap().grade, 2);
        assert!(db.student("S9999").is_none());
    }

    #[test]
    fn test_update_missing_student() {
        let (_dir, mut db) = create_test_db();
        let err = db
            .update_student("S1001", fixtures::student("Ada", 1))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_student_leaves_marks() {
        let (_dir, mut db) = create_test_db();
        let s = db.add_student(fixtures::student("Ada", 1)).unwrap();
        db.add_mark(Mark::new(&s.id, "Math", "Term 1", 88.0)).unwrap();

        assert!(db.delete_student(&s.id).unwrap());
        assert!(!db.delete_student(&s.id).unwrap());
        assert_eq!(db.marks_for_student(&s.id).len(), 1);
    }

    #[test]
    fn test_teacher_crud() {
        let (dir, mut db) = create_test_db();
        let t1 = db.add_teacher(fixtures::teacher("Alan", "Math")).unwrap();
        let t2 = db.add_teacher(fixtures::teacher("Grace", "CS")).unwrap();
        assert_eq!(t1.id, "T001");
        assert_eq!(t2.id, "T002");

        let mut edited = t2.clone();
        edited.department = "Computing".to_string();
        db.update_teacher("T002", edited).unwrap();

        assert!(db.delete_teacher("T001").unwrap());
        assert!(!db.delete_teacher("T404").unwrap());

        let reopened = SchoolDatabase::open(dir.path()).unwrap();
        assert_eq!(reopened.teachers().len(), 1);
        assert_eq!(reopened.teacher("T002").unwrap().department, "Computing");
    }

    #[test]
    fn test_mark_crud_and_grades() {
        let (_dir, mut db) = create_test_db();
        let m1 = db.add_mark(Mark::new("S1001", "Math", "Term 1", 91.0)).unwrap();
        let m2 = db.add_mark(Mark::new("S1001", "Art", "Term 1", 45.0)).unwrap();
        assert_eq!((m1.id, m2.id), (1, 2));
        assert_eq!(m1.grade, Some(crate::model::LetterGrade::APlus));

        let mut edited = m2.clone();
        edited.score = 65.0;
        edited.grade = Some(crate::model::LetterGrade::APlus);
        let updated = db.update_mark(2, edited).unwrap();
        assert_eq!(updated.grade, Some(crate::model::LetterGrade::B));

        assert!(db.delete_mark(1).unwrap());
        assert!(db.mark(1).is_none());
        assert!(db.update_mark(1, m1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_mark_for_unknown_student_is_allowed() {
        let (_dir, mut db) = create_test_db();
        let saved = db.add_mark(Mark::new("S9001", "Math", "Term 1", 70.0));
        assert!(saved.is_ok());
    }

    #[test]
    fn test_update_settings() {
        let (dir, mut db) = create_test_db();
        let settings = Settings {
            school_name: "Hillside High".to_string(),
            address: "1 Hill Rd".to_string(),
            phone: "555-1234".to_string(),
        };
        db.update_settings(settings.clone()).unwrap();

        let reopened = SchoolDatabase::open(dir.path()).unwrap();
        assert_eq!(reopened.settings(), &settings);
    }

    #[test]
    fn test_default_settings_from_options() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            pretty_json: false,
            default_settings: Settings {
                school_name: "Riverside".to_string(),
                ..Settings::default()
            },
        };
        let db = SchoolDatabase::open_with(dir.path(), options).unwrap();
        assert_eq!(db.settings().school_name, "Riverside");
        assert!(!db.pretty_json());
    }

    #[test]
    fn test_replace_rejects_duplicates() {
        let (_dir, mut db) = create_test_db();
        let mut a = fixtures::teacher("A", "Math");
        a.id = "T001".to_string();
        let b = a.clone();

        let err = db.replace_teachers(vec![a, b]).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { .. }));
        assert!(db.teachers().is_empty());
    }

    #[test]
    fn test_add_mark_after_max_id_is_refused() {
        let (_dir, mut db) = create_test_db();
        let mut last = Mark::new("S1001", "Math", "Term 1", 50.0);
        last.id = u64::MAX;
        db.replace_marks(vec![last]).unwrap();

        let err = db
            .add_mark(Mark::new("S1001", "Math", "Term 2", 60.0))
            .unwrap_err();
        assert!(matches!(err, Error::IdsExhausted { kind: "mark" }));
        assert_eq!(db.marks().len(), 1);
    }

    #[test]
    fn test_save_file_reloads_collection() {
        let (_dir, mut db) = create_test_db();
        let doc = json!([{
            "id": "S4001",
            "name": "Dana",
            "dateOfBirth": "2013-01-05",
            "grade": 4,
            "section": "C",
            "enrollmentDate": "2019-09-01"
        }]);

        db.save_file("students.json", &doc).unwrap();
        assert_eq!(db.students().len(), 1);
        assert_eq!(db.student("S4001").unwrap().name, "Dana");
    }

    #[test]
    fn test_save_file_rejects_wrong_shape_for_collection() {
        let (dir, mut db) = create_test_db();
        let err = db.save_file("marks.json", &json!({"oops": true})).unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert!(!dir.path().join("marks.json").exists());
    }

    #[test]
    fn test_save_file_other_json() {
        let (dir, mut db) = create_test_db();
        let path = db
            .save_file("backups/notes.json", &json!({"free": "form"}))
            .unwrap();
        assert_eq!(path, dir.path().join("backups/notes.json"));
    }

    #[test]
    fn test_save_file_outside_root() {
        let (_dir, mut db) = create_test_db();
        let err = db.save_file("../escape.json", &json!({})).unwrap_err();
        assert!(matches!(err, Error::PathOutsideRoot { .. }));
    }

    #[test]
    fn test_reload_picks_up_external_edits() {
        let (dir, mut db) = create_test_db();
        db.add_teacher(fixtures::teacher("Alan", "Math")).unwrap();
        std::fs::write(dir.path().join("teachers.json"), "[]").unwrap();

        db.reload_collection(Collection::Teachers).unwrap();
        assert!(db.teachers().is_empty());
    }

    #[test]
    fn test_stats() {
        let (_dir, mut db) = create_test_db();
        assert_eq!(db.stats().disk_bytes, 0);

        db.add_student(fixtures::student("Ada", 1)).unwrap();
        db.add_mark(Mark::new("S1001", "Math", "Term 1", 50.0)).unwrap();

        let stats = db.stats();
        assert_eq!(stats.students, 1);
        assert_eq!(stats.teachers, 0);
        assert_eq!(stats.marks, 1);
        assert!(stats.disk_bytes > 0);
    }
}
