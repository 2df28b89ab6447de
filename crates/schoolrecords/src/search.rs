//! Record search and filtering.
//!
//! Every query is a linear scan of the cached collection. Results keep
//! collection order.

use serde::Deserialize;

use crate::model::{Mark, Student, Teacher};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Normalized free-text needle, or `None` if blank.
fn needle(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

/// Student search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentQuery {
    /// Substring matched against name and ID, case-insensitive.
    pub q: Option<String>,
    /// Exact grade level.
    pub grade: Option<u8>,
    /// Section, case-insensitive.
    pub section: Option<String>,
}

impl StudentQuery {
    /// Apply the query to `students`.
    #[must_use]
    pub fn run<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        let needle = needle(self.q.as_deref());
        students
            .iter()
            .filter(|s| {
                needle
                    .as_deref()
                    .is_none_or(|n| contains_ci(&s.name, n) || contains_ci(&s.id, n))
            })
            .filter(|s| self.grade.is_none_or(|g| s.grade == g))
            .filter(|s| {
                self.section
                    .as_deref()
                    .is_none_or(|sec| eq_ci(&s.section, sec))
            })
            .collect()
    }
}

/// Teacher search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeacherQuery {
    /// Substring matched against name and ID, case-insensitive.
    pub q: Option<String>,
    /// Department, case-insensitive.
    pub department: Option<String>,
    /// Subject, case-insensitive.
    pub subject: Option<String>,
}

impl TeacherQuery {
    /// Apply the query to `teachers`.
    #[must_use]
    pub fn run<'a>(&self, teachers: &'a [Teacher]) -> Vec<&'a Teacher> {
        let needle = needle(self.q.as_deref());
        teachers
            .iter()
            .filter(|t| {
                needle
                    .as_deref()
                    .is_none_or(|n| contains_ci(&t.name, n) || contains_ci(&t.id, n))
            })
            .filter(|t| {
                self.department
                    .as_deref()
                    .is_none_or(|d| eq_ci(&t.department, d))
            })
            .filter(|t| {
                self.subject
                    .as_deref()
                    .is_none_or(|s| eq_ci(&t.subject, s))
            })
            .collect()
    }
}

/// Mark filter parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkQuery {
    /// Exact student ID.
    pub student_id: Option<String>,
    /// Subject, case-insensitive.
    pub subject: Option<String>,
    /// Term label, case-insensitive.
    pub term: Option<String>,
}

impl MarkQuery {
    /// Apply the query to `marks`.
    #[must_use]
    pub fn run<'a>(&self, marks: &'a [Mark]) -> Vec<&'a Mark> {
        marks
            .iter()
            .filter(|m| {
                self.student_id
                    .as_deref()
                    .is_none_or(|id| m.student_id == id)
            })
            .filter(|m| self.subject.as_deref().is_none_or(|s| eq_ci(&m.subject, s)))
            .filter(|m| self.term.as_deref().is_none_or(|t| eq_ci(&m.term, t)))
            .collect()
    }
}
