//! Field checks applied before a record is written.
//!
//! Checks cover presence, ranges and simple patterns only.
//! Cross-collection references (a mark's student) are not enforced here.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Mark, Settings, Student, Teacher};

/// Lowest accepted grade level.
pub const MIN_GRADE: u8 = 1;

/// Highest accepted grade level.
pub const MAX_GRADE: u8 = 12;

/// Blood groups accepted in medical info.
pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]+$").expect("valid phone regex"));

/// Accepted phone length in characters, including a leading `+`.
const PHONE_LEN: std::ops::RangeInclusive<usize> = 7..=20;

fn required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

fn optional_email(field: &'static str, value: Option<&str>) -> Result<()> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && !EMAIL.is_match(v) => {
            Err(Error::validation(field, format!("not an email address: {v}")))
        }
        _ => Ok(()),
    }
}

fn optional_phone(field: &'static str, value: Option<&str>) -> Result<()> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && (!PHONE.is_match(v) || !PHONE_LEN.contains(&v.len())) => {
            Err(Error::validation(field, format!("not a phone number: {v}")))
        }
        _ => Ok(()),
    }
}

fn not_in_future(field: &'static str, date: NaiveDate) -> Result<()> {
    if date > Utc::now().date_naive() {
        return Err(Error::validation(field, format!("{date} is in the future")));
    }
    Ok(())
}

/// Check a student record.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first failing field.
pub fn student(s: &Student) -> Result<()> {
    required("name", &s.name)?;
    required("section", &s.section)?;

    if !(MIN_GRADE..=MAX_GRADE).contains(&s.grade) {
        return Err(Error::validation(
            "grade",
            format!("{} is outside {MIN_GRADE}..={MAX_GRADE}", s.grade),
        ));
    }

    not_in_future("dateOfBirth", s.date_of_birth)?;
    if s.date_of_birth > s.enrollment_date {
        return Err(Error::validation(
            "dateOfBirth",
            "must not be after the enrollment date",
        ));
    }

    optional_email("parent.email", s.parent.email.as_deref())?;
    optional_phone("parent.phone", s.parent.phone.as_deref())?;

    if let Some(group) = s.medical.blood_group.as_deref().map(str::trim) {
        if !group.is_empty() && !BLOOD_GROUPS.contains(&group) {
            return Err(Error::validation(
                "medical.bloodGroup",
                format!("unknown blood group: {group}"),
            ));
        }
    }

    Ok(())
}

/// Check a teacher record.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first failing field.
pub fn teacher(t: &Teacher) -> Result<()> {
    required("name", &t.name)?;
    required("subject", &t.subject)?;
    optional_email("email", t.email.as_deref())?;
    optional_phone("phone", t.phone.as_deref())?;
    not_in_future("joinDate", t.join_date)
}

/// Check a mark record.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first failing field.
pub fn mark(m: &Mark) -> Result<()> {
    required("studentId", &m.student_id)?;
    required("subject", &m.subject)?;
    required("term", &m.term)?;

    if !m.score.is_finite() || !(0.0..=100.0).contains(&m.score) {
        return Err(Error::validation(
            "score",
            format!("{} is outside 0..=100", m.score),
        ));
    }
    Ok(())
}

/// Check the settings record.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the school name is empty or the phone is
/// malformed.
pub fn settings(s: &Settings) -> Result<()> {
    required("schoolName", &s.school_name)?;
    optional_phone("phone", Some(&s.phone))
}
