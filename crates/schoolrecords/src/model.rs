//! Core record types for schoolrecords.
//!
//! Students, teachers, marks and the school settings record. All types
//! serialize as camelCase JSON so the browser front end can use them as-is.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Contact details for a student's parent or guardian.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentContact {
    /// Parent or guardian name.
    pub name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Medical information kept for a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalInfo {
    /// Blood group, e.g. `O+`.
    pub blood_group: Option<String>,
    /// Free-text allergy notes.
    pub allergies: Option<String>,
}

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Sequential ID such as `S1001`. Assigned by the database on insert.
    #[serde(default)]
    pub id: String,
    /// Full name.
    pub name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Grade level, 1 through 12.
    pub grade: u8,
    /// Class section within the grade.
    pub section: String,
    /// Parent or guardian contact.
    #[serde(default)]
    pub parent: ParentContact,
    /// Home address.
    #[serde(default)]
    pub address: String,
    /// Date the student enrolled.
    pub enrollment_date: NaiveDate,
    /// Medical information.
    #[serde(default)]
    pub medical: MedicalInfo,
}

/// Whether a teacher is employed full time or part time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    /// Full-time staff.
    #[default]
    FullTime,
    /// Part-time staff.
    PartTime,
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullTime => write!(f, "full-time"),
            Self::PartTime => write!(f, "part-time"),
        }
    }
}

/// A teacher record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Sequential ID such as `T001`. Assigned by the database on insert.
    #[serde(default)]
    pub id: String,
    /// Full name.
    pub name: String,
    /// Main subject taught.
    pub subject: String,
    /// Department.
    #[serde(default)]
    pub department: String,
    /// Role, e.g. "Class Teacher" or "Head of Department".
    #[serde(default)]
    pub role: String,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Highest qualification.
    #[serde(default)]
    pub education: String,
    /// Date the teacher joined.
    pub join_date: NaiveDate,
    /// Full-time or part-time.
    #[serde(default)]
    pub employment_type: EmploymentType,
}

/// Letter grade derived from a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    /// 90 and above.
    #[serde(rename = "A+")]
    APlus,
    /// 80 to 89.
    #[serde(rename = "A")]
    A,
    /// 70 to 79.
    #[serde(rename = "B+")]
    BPlus,
    /// 60 to 69.
    #[serde(rename = "B")]
    B,
    /// 50 to 59.
    #[serde(rename = "C")]
    C,
    /// 40 to 49.
    #[serde(rename = "D")]
    D,
    /// Below 40.
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Map a 0-100 score onto the grading scale.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::APlus,
            s if s >= 80.0 => Self::A,
            s if s >= 70.0 => Self::BPlus,
            s if s >= 60.0 => Self::B,
            s if s >= 50.0 => Self::C,
            s if s >= 40.0 => Self::D,
            _ => Self::F,
        }
    }

    /// All grades from best to worst.
    #[must_use]
    pub fn all() -> [Self; 7] {
        [
            Self::APlus,
            Self::A,
            Self::BPlus,
            Self::B,
            Self::C,
            Self::D,
            Self::F,
        ]
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(s)
    }
}

/// A single assessment result for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    /// Numeric sequential ID. Assigned by the database on insert.
    #[serde(default)]
    pub id: u64,
    /// ID of the student this mark belongs to. Not checked against the
    /// student collection.
    pub student_id: String,
    /// Subject name.
    pub subject: String,
    /// Term label, e.g. "Term 1".
    pub term: String,
    /// Score out of 100.
    pub score: f64,
    /// Letter grade, recomputed from `score` on every write.
    #[serde(default)]
    pub grade: Option<LetterGrade>,
    /// Teacher's comment.
    #[serde(default)]
    pub comment: String,
    /// When the mark was recorded.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Mark {
    /// Create a new mark recorded now. The ID is assigned on insert.
    #[must_use]
    pub fn new(
        student_id: impl Into<String>,
        subject: impl Into<String>,
        term: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id: 0,
            student_id: student_id.into(),
            subject: subject.into(),
            term: term.into(),
            score,
            grade: Some(LetterGrade::from_score(score)),
            comment: String::new(),
            timestamp: Utc::now(),
        }
    }

    /// Recompute the letter grade from the score.
    pub fn regrade(&mut self) {
        self.grade = Some(LetterGrade::from_score(self.score));
    }
}

/// The single school settings record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// School name.
    pub school_name: String,
    /// School address.
    pub address: String,
    /// School phone number.
    pub phone: String,
}

impl From<&crate::config::SchoolConfig> for Settings {
    fn from(school: &crate::config::SchoolConfig) -> Self {
        Self {
            school_name: school.name.clone(),
            address: school.address.clone(),
            phone: school.phone.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    pub fn student(name: &str, grade: u8) -> Student {
        Student {
            id: String::new(),
            name: name.to_string(),
            date_of_birth: date(2012, 4, 2),
            grade,
            section: "A".to_string(),
            parent: ParentContact {
                name: "Pat Doe".to_string(),
                phone: Some("+1 555 0100".to_string()),
                email: Some("pat@example.com".to_string()),
            },
            address: "12 Elm Street".to_string(),
            enrollment_date: date(2020, 9, 1),
            medical: MedicalInfo {
                blood_group: Some("O+".to_string()),
                allergies: None,
            },
        }
    }

    pub fn teacher(name: &str, subject: &str) -> Teacher {
        Teacher {
            id: String::new(),
            name: name.to_string(),
            subject: subject.to_string(),
            department: "Science".to_string(),
            role: "Class Teacher".to_string(),
            phone: Some("555-0199".to_string()),
            email: Some("teacher@example.com".to_string()),
            education: "M.Ed".to_string(),
            join_date: date(2015, 8, 15),
            employment_type: EmploymentType::FullTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_grade_boundaries() {
        assert_eq!(LetterGrade::from_score(100.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_score(90.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_score(89.9), LetterGrade::A);
        assert_eq!(LetterGrade::from_score(70.0), LetterGrade::BPlus);
        assert_eq!(LetterGrade::from_score(60.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_score(50.0), LetterGrade::C);
        assert_eq!(LetterGrade::from_score(40.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_score(39.99), LetterGrade::F);
        assert_eq!(LetterGrade::from_score(0.0), LetterGrade::F);
    }

    #[test]
    fn test_letter_grade_display_matches_serde() {
        for grade in LetterGrade::all() {
            let json = serde_json::to_string(&grade).unwrap();
            assert_eq!(json, format!("\"{grade}\""));
        }
    }

    #[test]
    fn test_student_wire_format_is_camel_case() {
        let mut student = fixtures::student("Ada Lovelace", 5);
        student.id = "S5001".to_string();

        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["id"], "S5001");
        assert_eq!(value["dateOfBirth"], "2012-04-02");
        assert_eq!(value["enrollmentDate"], "2020-09-01");
        assert_eq!(value["medical"]["bloodGroup"], "O+");
    }

    #[test]
    fn test_student_input_without_id() {
        let json = r#"{
            "name": "Grace Hopper",
            "dateOfBirth": "2011-12-09",
            "grade": 6,
            "section": "B",
            "enrollmentDate": "2019-09-01"
        }"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert!(student.id.is_empty());
        assert_eq!(student.grade, 6);
        assert_eq!(student.parent, ParentContact::default());
        assert_eq!(student.medical, MedicalInfo::default());
    }

    #[test]
    fn test_teacher_employment_type_wire_format() {
        let mut teacher = fixtures::teacher("Alan Turing", "Mathematics");
        teacher.employment_type = EmploymentType::PartTime;

        let value = serde_json::to_value(&teacher).unwrap();
        assert_eq!(value["employmentType"], "part-time");
        assert_eq!(value["joinDate"], "2015-08-15");
        assert_eq!(EmploymentType::PartTime.to_string(), "part-time");
    }

    #[test]
    fn test_mark_new_sets_grade() {
        let mark = Mark::new("S1001", "Science", "Term 1", 84.5);
        assert_eq!(mark.id, 0);
        assert_eq!(mark.grade, Some(LetterGrade::A));
    }

    #[test]
    fn test_mark_regrade() {
        let mut mark = Mark::new("S1001", "Science", "Term 1", 84.5);
        mark.score = 35.0;
        mark.regrade();
        assert_eq!(mark.grade, Some(LetterGrade::F));
    }

    #[test]
    fn test_mark_defaults_when_missing() {
        let json = r#"{"studentId": "S1001", "subject": "Art", "term": "Term 2", "score": 71}"#;
        let mark: Mark = serde_json::from_str(json).unwrap();
        assert_eq!(mark.id, 0);
        assert!(mark.grade.is_none());
        assert!(mark.comment.is_empty());
    }

    #[test]
    fn test_settings_from_school_config() {
        let school = crate::config::SchoolConfig::default();
        let settings = Settings::from(&school);
        assert_eq!(settings.school_name, "My School");
    }
}
