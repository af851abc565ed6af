//! Catalog and student records held by the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Catalog code of an offering, e.g. `CS101`.
    CourseId
);
string_id!(StudentId);
string_id!(
    /// Opaque meeting time such as `"Mon/Wed 09:00-10:30"`; equal strings clash.
    TimeSlot
);

/// A course section open for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOffering {
    pub id: CourseId,
    pub title: String,
    pub department: String,
    pub time_slot: TimeSlot,
    pub capacity: u32,
    /// Seats taken. Seed catalogs may omit it.
    #[serde(default)]
    pub enrolled: u32,
    pub credits: u32,
}

impl CourseOffering {
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }

    #[must_use]
    pub fn in_department(&self, department: &str) -> bool {
        self.department.eq_ignore_ascii_case(department)
    }
}

/// Personal data supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub first_name: String,
    pub last_name: String,
    /// University-issued number; unique across students.
    pub student_number: String,
    pub email: String,
    pub department: String,
}

impl StudentProfile {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A registered student and the courses they hold, keyed to the enrollment date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(flatten)]
    pub profile: StudentProfile,
    #[serde(default)]
    pub courses: BTreeMap<CourseId, NaiveDate>,
}

impl Student {
    #[must_use]
    pub fn holds(&self, course: &CourseId) -> bool {
        self.courses.contains_key(course)
    }

    pub fn course_ids(&self) -> impl Iterator<Item = &CourseId> {
        self.courses.keys()
    }
}

/// One row of a course roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student: StudentId,
    pub name: String,
    pub student_number: String,
    pub enrolled_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_offerings_default_to_zero_enrolled() {
        let raw = r#"{"id":"CS101","title":"Intro","department":"CS","timeSlot":"Mon 09:00","capacity":30,"credits":5}"#;
        let course: CourseOffering = serde_json::from_str(raw).unwrap();
        assert_eq!(course.enrolled, 0);
        assert_eq!(course.remaining(), 30);
        assert_eq!(course.time_slot, TimeSlot::from("Mon 09:00"));
    }

    #[test]
    fn full_course_has_no_remaining_seats() {
        let course = CourseOffering {
            id: "MA201".into(),
            title: "Linear Algebra".to_owned(),
            department: "Math".to_owned(),
            time_slot: "Tue 11:00".into(),
            capacity: 2,
            enrolled: 2,
            credits: 4,
        };
        assert!(course.is_full());
        assert_eq!(course.remaining(), 0);
        assert!(course.in_department("math"));
    }
}
