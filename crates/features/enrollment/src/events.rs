use crate::model::{CourseId, StudentId};

/// Published on the shared event bus after a change is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentEvent {
    StudentRegistered { student: StudentId },
    Enrolled { student: StudentId, course: CourseId, remaining: u32 },
    Dropped { student: StudentId, course: CourseId, remaining: u32 },
    Submitted { student: StudentId, added: Vec<CourseId>, removed: Vec<CourseId> },
}

impl EnrollmentEvent {
    #[must_use]
    pub const fn student(&self) -> &StudentId {
        match self {
            Self::StudentRegistered { student }
            | Self::Enrolled { student, .. }
            | Self::Dropped { student, .. }
            | Self::Submitted { student, .. } => student,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StudentRegistered { .. } => "student_registered",
            Self::Enrolled { .. } => "enrolled",
            Self::Dropped { .. } => "dropped",
            Self::Submitted { .. } => "submitted",
        }
    }
}
