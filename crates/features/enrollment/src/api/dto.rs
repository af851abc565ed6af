use crate::model::{CourseId, CourseOffering, RosterEntry, Student, StudentProfile};
use crate::planner::Admission;
use crate::{RegistrationCheck, SubmitOutcome};
use chrono::NaiveDate;
use unireg_derive::api_model;

/// A course offering with its live seat count.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct CourseView {
    pub id: String,
    pub title: String,
    pub department: String,
    pub time_slot: String,
    pub capacity: u32,
    pub enrolled: u32,
    pub remaining: u32,
    pub credits: u32,
}

impl From<CourseOffering> for CourseView {
    fn from(course: CourseOffering) -> Self {
        Self {
            remaining: course.remaining(),
            id: course.id.to_string(),
            title: course.title,
            department: course.department,
            time_slot: course.time_slot.to_string(),
            capacity: course.capacity,
            enrolled: course.enrolled,
            credits: course.credits,
        }
    }
}

#[api_model]
pub struct CourseQuery {
    /// Case-insensitive department filter.
    pub department: Option<String>,
}

#[api_model]
pub struct RegisterStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    pub email: String,
    pub department: String,
}

impl From<RegisterStudentRequest> for StudentProfile {
    fn from(req: RegisterStudentRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            student_number: req.student_number,
            email: req.email,
            department: req.department,
        }
    }
}

#[api_model]
pub struct StudentSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    pub email: String,
    pub department: String,
    pub course_count: usize,
}

impl From<Student> for StudentSummary {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.to_string(),
            course_count: student.courses.len(),
            first_name: student.profile.first_name,
            last_name: student.profile.last_name,
            student_number: student.profile.student_number,
            email: student.profile.email,
            department: student.profile.department,
        }
    }
}

#[api_model]
pub struct HeldCourse {
    pub course: CourseView,
    pub enrolled_on: NaiveDate,
}

/// A student with the courses they hold.
#[api_model]
pub struct StudentDetail {
    pub student: StudentSummary,
    pub courses: Vec<HeldCourse>,
    pub total_credits: u32,
}

#[api_model]
pub struct RosterEntryView {
    pub student_id: String,
    pub name: String,
    pub student_number: String,
    pub enrolled_on: NaiveDate,
}

impl From<RosterEntry> for RosterEntryView {
    fn from(entry: RosterEntry) -> Self {
        Self {
            student_id: entry.student.to_string(),
            name: entry.name,
            student_number: entry.student_number,
            enrolled_on: entry.enrolled_on,
        }
    }
}

/// The complete new selection.
#[api_model]
pub struct SubmitRequest {
    pub course_ids: Vec<String>,
}

#[api_model]
pub struct SubmitResponse {
    pub course_ids: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub total_credits: u32,
}

impl SubmitResponse {
    pub(crate) fn new(outcome: SubmitOutcome, total_credits: u32) -> Self {
        let strings = |ids: Vec<CourseId>| ids.into_iter().map(|id| id.to_string()).collect();
        Self {
            course_ids: strings(outcome.courses),
            added: strings(outcome.added),
            removed: strings(outcome.removed),
            total_credits,
        }
    }
}

#[api_model]
pub struct CheckRequest {
    /// Course the student wants to add.
    pub course_id: String,
    /// Courses already in the working selection. Ids must be known and distinct.
    #[serde(default)]
    pub selection: Vec<String>,
}

#[api_model]
pub struct CheckResponse {
    /// `ALLOWED`, `ALREADY_MAX_COURSES`, `COURSE_FULL` or `TIME_CONFLICT`.
    pub decision: String,
    pub conflicting_course_id: Option<String>,
    pub can_submit: bool,
    pub total_credits: u32,
    pub selected_count: usize,
}

impl From<RegistrationCheck> for CheckResponse {
    fn from(check: RegistrationCheck) -> Self {
        let conflicting_course_id = match &check.admission {
            Admission::TimeConflict { conflicting } => Some(conflicting.to_string()),
            _ => None,
        };
        Self {
            decision: check.admission.code().to_owned(),
            conflicting_course_id,
            can_submit: check.can_submit,
            total_credits: check.total_credits,
            selected_count: check.selected,
        }
    }
}
