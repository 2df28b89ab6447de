//! On-disk layout of the record collections.

use std::fmt;

/// One of the four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `students.json`
    Students,
    /// `teachers.json`
    Teachers,
    /// `marks.json`
    Marks,
    /// `settings.json`
    Settings,
}

impl Collection {
    /// Every collection, in load order.
    pub const ALL: [Self; 4] = [Self::Students, Self::Teachers, Self::Marks, Self::Settings];

    /// File name inside the data directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Students => "students.json",
            Self::Teachers => "teachers.json",
            Self::Marks => "marks.json",
            Self::Settings => "settings.json",
        }
    }

    /// Find the collection stored under `file_name`, if any.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.file_name() == file_name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Students => write!(f, "students"),
            Self::Teachers => write!(f, "teachers"),
            Self::Marks => write!(f, "marks"),
            Self::Settings => write!(f, "settings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_round_trip() {
        for c in Collection::ALL {
            assert_eq!(Collection::from_file_name(c.file_name()), Some(c));
        }
        assert_eq!(Collection::from_file_name("notes.json"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Collection::Marks.to_string(), "marks");
    }
}
