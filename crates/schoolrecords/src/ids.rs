//! Sequential, human-readable record IDs.
//!
//! Students get `S{grade}{NNN}`, teachers `T{NNN}`, marks a plain counter.
//! The next value is always one past the largest suffix currently in the
//! collection, so gaps left by deletions below the maximum are not reused.

use crate::error::{Error, Result};
use crate::model::{Mark, Student, Teacher};

/// Width of the zero-padded sequence part.
const SEQUENCE_WIDTH: usize = 3;

/// Prefix for teacher IDs.
const TEACHER_PREFIX: &str = "T";

/// Prefix used for students in the given grade.
#[must_use]
pub fn student_prefix(grade: u8) -> String {
    format!("S{grade}")
}

/// Parse the sequence number after `prefix`.
///
/// The remainder must be all digits and either exactly three wide, or wider
/// without a leading zero. This keeps `S10001` (grade 10, #1) from being
/// read as grade 1, #1.
#[must_use]
pub fn parse_sequence(id: &str, prefix: &str) -> Option<u32> {
    let rest = id.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let fits = rest.len() == SEQUENCE_WIDTH
        || (rest.len() > SEQUENCE_WIDTH && !rest.starts_with('0'));
    if !fits {
        return None;
    }
    rest.parse().ok()
}

fn next_prefixed<'a>(
    ids: impl Iterator<Item = &'a str> + Clone,
    prefix: &str,
    kind: &'static str,
) -> Result<String> {
    let max = ids
        .clone()
        .filter_map(|id| parse_sequence(id, prefix))
        .max()
        .unwrap_or(0);

    let mut seq = max.checked_add(1);
    while let Some(n) = seq {
        let candidate = format!("{prefix}{n:0width$}", width = SEQUENCE_WIDTH);
        // Ambiguous prefixes (grade 1 vs 11) can make a candidate collide.
        if !ids.clone().any(|id| id == candidate) {
            return Ok(candidate);
        }
        seq = n.checked_add(1);
    }
    Err(Error::IdsExhausted { kind })
}

/// Next student ID for `grade`.
///
/// # Errors
///
/// Returns [`Error::IdsExhausted`] if the grade's sequence is at its limit.
pub fn next_student_id(students: &[Student], grade: u8) -> Result<String> {
    next_prefixed(
        students.iter().map(|s| s.id.as_str()),
        &student_prefix(grade),
        "student",
    )
}

/// Next teacher ID.
///
/// # Errors
///
/// Returns [`Error::IdsExhausted`] if the sequence is at its limit.
pub fn next_teacher_id(teachers: &[Teacher]) -> Result<String> {
    next_prefixed(
        teachers.iter().map(|t| t.id.as_str()),
        TEACHER_PREFIX,
        "teacher",
    )
}

/// Next mark ID.
///
/// # Errors
///
/// Returns [`Error::IdsExhausted`] if a stored mark already holds `u64::MAX`.
pub fn next_mark_id(marks: &[Mark]) -> Result<u64> {
    marks
        .iter()
        .map(|m| m.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(Error::IdsExhausted { kind: "mark" })
}

/// First ID that appears more than once, if any.
#[must_use]
pub fn find_duplicate<I, S>(ids: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .find(|id| !seen.insert(id.as_ref().to_string()))
        .map(|id| id.as_ref().to_string())
}
