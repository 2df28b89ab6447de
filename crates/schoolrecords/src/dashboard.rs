//! Summary figures for the dashboard and per-student report cards.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{LetterGrade, Mark, Student};
use crate::storage::SchoolDatabase;

/// Number of marks listed under "recent activity".
pub const RECENT_MARKS: usize = 5;

/// Figures backing the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// School name from settings.
    pub school_name: String,
    /// Number of students.
    pub total_students: usize,
    /// Number of teachers.
    pub total_teachers: usize,
    /// Number of marks.
    pub total_marks: usize,
    /// Students per grade level.
    pub students_by_grade: BTreeMap<u8, usize>,
    /// Teachers per department.
    pub teachers_by_department: BTreeMap<String, usize>,
    /// Mean score per subject.
    pub average_by_subject: BTreeMap<String, f64>,
    /// Marks per letter grade, every grade present.
    pub grade_distribution: BTreeMap<String, usize>,
    /// Most recent marks, newest first.
    pub recent_marks: Vec<Mark>,
}

impl DashboardSummary {
    /// Compute the summary from the current database contents.
    #[must_use]
    pub fn compute(db: &SchoolDatabase) -> Self {
        let mut students_by_grade = BTreeMap::new();
        for s in db.students() {
            *students_by_grade.entry(s.grade).or_insert(0) += 1;
        }

        let mut teachers_by_department = BTreeMap::new();
        for t in db.teachers() {
            let dept = if t.department.trim().is_empty() {
                "Unassigned".to_string()
            } else {
                t.department.trim().to_string()
            };
            *teachers_by_department.entry(dept).or_insert(0) += 1;
        }

        let mut grade_distribution: BTreeMap<String, usize> = LetterGrade::all()
            .iter()
            .map(|g| (g.to_string(), 0))
            .collect();
        for m in db.marks() {
            let grade = m.grade.unwrap_or_else(|| LetterGrade::from_score(m.score));
            *grade_distribution.entry(grade.to_string()).or_insert(0) += 1;
        }

        let mut recent_marks: Vec<Mark> = db.marks().to_vec();
        recent_marks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        recent_marks.truncate(RECENT_MARKS);

        Self {
            school_name: db.settings().school_name.clone(),
            total_students: db.students().len(),
            total_teachers: db.teachers().len(),
            total_marks: db.marks().len(),
            students_by_grade,
            teachers_by_department,
            average_by_subject: subject_averages(db.marks().iter()),
            grade_distribution,
            recent_marks,
        }
    }
}

/// Mean score per subject, rounded to two decimals.
fn subject_averages<'a>(marks: impl Iterator<Item = &'a Mark>) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for m in marks {
        let entry = sums.entry(m.subject.clone()).or_insert((0.0, 0));
        entry.0 += m.score;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(subject, (sum, n))| (subject, round2(sum / f64::from(n))))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One student's marks with averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    /// The student.
    pub student: Student,
    /// Their marks in stored order.
    pub marks: Vec<Mark>,
    /// Mean score per subject.
    pub subject_averages: BTreeMap<String, f64>,
    /// Mean of all their scores, if they have any.
    pub overall_average: Option<f64>,
    /// Letter grade for the overall average.
    pub overall_grade: Option<LetterGrade>,
}

impl StudentReport {
    /// Build the report for `student_id`, or `None` if no such student.
    #[must_use]
    pub fn build(db: &SchoolDatabase, student_id: &str) -> Option<Self> {
        let student = db.student(student_id)?.clone();
        let marks: Vec<Mark> = db
            .marks_for_student(student_id)
            .into_iter()
            .cloned()
            .collect();

        let overall_average = if marks.is_empty() {
            None
        } else {
            let sum: f64 = marks.iter().map(|m| m.score).sum();
            #[allow(clippy::cast_precision_loss)]
            Some(round2(sum / marks.len() as f64))
        };

        Some(Self {
            subject_averages: subject_averages(marks.iter()),
            overall_grade: overall_average.map(LetterGrade::from_score),
            overall_average,
            student,
            marks,
        })
    }
}
