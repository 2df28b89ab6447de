//! Text rendering for list and report commands.

use std::fmt::Write as _;

use crate::dashboard::{DashboardSummary, StudentReport};
use crate::error::Result;
use crate::model::{Mark, Student, Teacher};

use super::OutputFormat;

fn aligned(cells: &[&str], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

/// Render rows as aligned columns under `header`.
fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();

    let mut out = aligned(header, &widths);
    out.push_str(&aligned(&rule, &widths));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&aligned(&cells, &widths));
    }
    out
}

fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| "-".to_string())
}

/// Render a student list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn students(list: &[&Student], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(list)?,
        OutputFormat::Plain => list
            .iter()
            .map(|s| format!("{}\t{}\n", s.id, s.name))
            .collect(),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = list
                .iter()
                .map(|s| {
                    vec![
                        s.id.clone(),
                        s.name.clone(),
                        s.grade.to_string(),
                        s.section.clone(),
                        opt(s.parent.phone.as_ref()),
                    ]
                })
                .collect();
            table(&["ID", "NAME", "GRADE", "SECTION", "PARENT PHONE"], &rows)
        }
    })
}

/// Render a teacher list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn teachers(list: &[&Teacher], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(list)?,
        OutputFormat::Plain => list
            .iter()
            .map(|t| format!("{}\t{}\n", t.id, t.name))
            .collect(),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = list
                .iter()
                .map(|t| {
                    vec![
                        t.id.clone(),
                        t.name.clone(),
                        t.subject.clone(),
                        t.department.clone(),
                        t.employment_type.to_string(),
                    ]
                })
                .collect();
            table(&["ID", "NAME", "SUBJECT", "DEPARTMENT", "TYPE"], &rows)
        }
    })
}

/// Render a mark list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn marks(list: &[&Mark], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(list)?,
        OutputFormat::Plain => list
            .iter()
            .map(|m| format!("{}\t{}\t{}\t{}\n", m.id, m.student_id, m.subject, m.score))
            .collect(),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = list
                .iter()
                .map(|m| {
                    vec![
                        m.id.to_string(),
                        m.student_id.clone(),
                        m.subject.clone(),
                        m.term.clone(),
                        m.score.to_string(),
                        m.grade.map(|g| g.to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            table(&["ID", "STUDENT", "SUBJECT", "TERM", "SCORE", "GRADE"], &rows)
        }
    })
}

/// Render a report card.
#[must_use]
pub fn report(report: &StudentReport) -> String {
    let s = &report.student;
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", s.name, s.id);
    let _ = writeln!(out, "Grade {} section {}", s.grade, s.section);
    let _ = writeln!(out, "Born {}, enrolled {}", s.date_of_birth, s.enrollment_date);
    out.push('\n');

    if report.marks.is_empty() {
        out.push_str("No marks recorded.\n");
        return out;
    }

    let rows: Vec<Vec<String>> = report
        .marks
        .iter()
        .map(|m| {
            vec![
                m.subject.clone(),
                m.term.clone(),
                m.score.to_string(),
                m.grade.map(|g| g.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    out.push_str(&table(&["SUBJECT", "TERM", "SCORE", "GRADE"], &rows));
    out.push('\n');

    for (subject, avg) in &report.subject_averages {
        let _ = writeln!(out, "{subject:<16} avg {avg:.2}");
    }
    if let (Some(avg), Some(grade)) = (report.overall_average, report.overall_grade) {
        let _ = writeln!(out, "Overall          {avg:.2} ({grade})");
    }
    out
}

/// Render dashboard figures for `status`.
#[must_use]
pub fn dashboard(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "School:        {}", summary.school_name);
    let _ = writeln!(out, "Students:      {}", summary.total_students);
    let _ = writeln!(out, "Teachers:      {}", summary.total_teachers);
    let _ = writeln!(out, "Marks:         {}", summary.total_marks);

    if !summary.students_by_grade.is_empty() {
        out.push_str("\nStudents by grade\n");
        for (grade, n) in &summary.students_by_grade {
            let _ = writeln!(out, "  {grade:>2}  {n}");
        }
    }
    if !summary.average_by_subject.is_empty() {
        out.push_str("\nAverage by subject\n");
        for (subject, avg) in &summary.average_by_subject {
            let _ = writeln!(out, "  {subject:<16} {avg:.2}");
        }
    }
    out
}
