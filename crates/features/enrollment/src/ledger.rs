//! The authoritative seat ledger.
//!
//! All state sits behind one `RwLock`. Reads share it; `enroll`, `drop_course`,
//! `submit` and `register_student` hold the write guard for their whole
//! validate-then-commit sequence, so two requests can never both claim the last
//! seat and a course counter never drifts from its membership set.

use crate::error::EnrollmentError;
use crate::model::{CourseId, CourseOffering, RosterEntry, Student, StudentId, StudentProfile};
use crate::planner::SelectionLimits;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use unireg_kernel::ident::IdentGuard;
use unireg_kernel::safe_nanoid;

#[derive(Debug, Default)]
struct LedgerState {
    courses: BTreeMap<CourseId, CourseOffering>,
    students: BTreeMap<StudentId, Student>,
    /// Bumped once per committed change.
    revision: u64,
}

/// Serializable image of the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub revision: u64,
    pub courses: Vec<CourseOffering>,
    #[serde(default)]
    pub students: Vec<Student>,
}

/// What a successful [`EnrollmentLedger::submit`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub student: StudentId,
    /// The student's full set after the commit.
    pub courses: Vec<CourseId>,
    pub added: Vec<CourseId>,
    pub removed: Vec<CourseId>,
}

#[derive(Debug, Clone)]
pub struct EnrollmentLedger {
    state: Arc<RwLock<LedgerState>>,
    limits: SelectionLimits,
}

impl EnrollmentLedger {
    /// An empty ledger with no catalog.
    #[must_use]
    pub fn new(limits: SelectionLimits) -> Self {
        Self { state: Arc::default(), limits }
    }

    /// Builds a ledger over a fresh catalog with no students.
    ///
    /// # Errors
    /// [`EnrollmentError::Validation`] when the catalog is inconsistent.
    pub fn with_catalog(
        courses: Vec<CourseOffering>,
        limits: SelectionLimits,
    ) -> Result<Self, EnrollmentError> {
        Self::from_snapshot(LedgerSnapshot { revision: 0, courses, students: Vec::new() }, limits)
    }

    /// Restores a ledger after checking every invariant of the snapshot.
    ///
    /// # Errors
    /// [`EnrollmentError::Validation`] on malformed ids, duplicate courses,
    /// students or student numbers, unknown held courses, `enrolled > capacity`,
    /// or a counter that disagrees with the memberships.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        limits: SelectionLimits,
    ) -> Result<Self, EnrollmentError> {
        let LedgerSnapshot { revision, courses: offered, students: registered } = snapshot;

        let mut courses = BTreeMap::new();
        for course in offered {
            validate_offering(&course)?;
            if let Some(previous) = courses.insert(course.id.clone(), course) {
                return Err(EnrollmentError::validation(format!("duplicate course '{}'", previous.id)));
            }
        }

        let mut holders: BTreeMap<&CourseId, u32> = BTreeMap::new();
        let mut numbers = BTreeSet::new();
        let mut students = BTreeMap::new();
        for student in &registered {
            if IdentGuard::verify(student.id.as_str(), "student")? != student.id.as_str() {
                return Err(EnrollmentError::validation(format!(
                    "student id '{}' has surrounding whitespace",
                    student.id
                )));
            }
            if !numbers.insert(student.profile.student_number.as_str()) {
                return Err(EnrollmentError::validation(format!(
                    "duplicate student number '{}'",
                    student.profile.student_number
                )));
            }
            for course in student.course_ids() {
                if !courses.contains_key(course) {
                    return Err(EnrollmentError::validation(format!(
                        "student '{}' holds unknown course '{course}'",
                        student.id
                    )));
                }
                *holders.entry(course).or_default() += 1;
            }
            if students.insert(student.id.clone(), student.clone()).is_some() {
                return Err(EnrollmentError::validation(format!("duplicate student '{}'", student.id)));
            }
        }

        for course in courses.values() {
            let held = holders.get(&course.id).copied().unwrap_or_default();
            if held != course.enrolled {
                return Err(EnrollmentError::validation(format!(
                    "course '{}' counts {} enrolled but {held} students hold it",
                    course.id, course.enrolled
                )));
            }
        }

        debug!(courses = courses.len(), students = students.len(), revision, "Ledger restored");
        Ok(Self { state: Arc::new(RwLock::new(LedgerState { courses, students, revision })), limits })
    }

    #[must_use]
    pub const fn limits(&self) -> SelectionLimits {
        self.limits
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            revision: state.revision,
            courses: state.courses.values().cloned().collect(),
            students: state.students.values().cloned().collect(),
        }
    }

    pub fn course(&self, id: &CourseId) -> Result<CourseOffering, EnrollmentError> {
        self.state.read().courses.get(id).cloned().ok_or_else(|| EnrollmentError::not_found("course", id))
    }

    /// Catalog in id order, optionally limited to one department (case-insensitive).
    #[must_use]
    pub fn courses(&self, department: Option<&str>) -> Vec<CourseOffering> {
        self.state
            .read()
            .courses
            .values()
            .filter(|course| department.is_none_or(|dept| course.in_department(dept)))
            .cloned()
            .collect()
    }

    pub fn student(&self, id: &StudentId) -> Result<Student, EnrollmentError> {
        self.state.read().students.get(id).cloned().ok_or_else(|| EnrollmentError::not_found("student", id))
    }

    #[must_use]
    pub fn students(&self) -> Vec<Student> {
        self.state.read().students.values().cloned().collect()
    }

    /// The student together with the offerings they hold, read under one lock.
    pub fn student_with_courses(
        &self,
        id: &StudentId,
    ) -> Result<(Student, Vec<CourseOffering>), EnrollmentError> {
        let state = self.state.read();
        let student = state.students.get(id).ok_or_else(|| EnrollmentError::not_found("student", id))?;
        let held = student.course_ids().filter_map(|course| state.courses.get(course)).cloned().collect();
        Ok((student.clone(), held))
    }

    /// Students holding `course`, ordered by student id.
    pub fn roster(&self, course: &CourseId) -> Result<Vec<RosterEntry>, EnrollmentError> {
        let state = self.state.read();
        if !state.courses.contains_key(course) {
            return Err(EnrollmentError::not_found("course", course));
        }

        Ok(state
            .students
            .values()
            .filter_map(|student| {
                student.courses.get(course).map(|enrolled_on| RosterEntry {
                    student: student.id.clone(),
                    name: student.profile.full_name(),
                    student_number: student.profile.student_number.clone(),
                    enrolled_on: *enrolled_on,
                })
            })
            .collect())
    }

    /// Adds a student with an empty enrollment set.
    ///
    /// # Errors
    /// [`EnrollmentError::Validation`] for blank fields, a malformed e-mail or a
    /// student number that is already taken.
    pub fn register_student(&self, profile: StudentProfile) -> Result<Student, EnrollmentError> {
        let profile = normalize_profile(profile)?;

        let mut state = self.state.write();
        if state.students.values().any(|s| s.profile.student_number == profile.student_number) {
            return Err(EnrollmentError::validation(format!(
                "student number '{}' is already registered",
                profile.student_number
            )));
        }

        let id = loop {
            let candidate = StudentId::from(safe_nanoid!());
            if !state.students.contains_key(&candidate) {
                break candidate;
            }
        };
        let student = Student { id: id.clone(), profile, courses: BTreeMap::new() };
        state.students.insert(id, student.clone());
        state.revision += 1;

        info!(student = %student.id, number = %student.profile.student_number, "Student registered");
        Ok(student)
    }

    /// Takes one seat in `course` for `student`.
    ///
    /// Returns the offering as it stands after the commit.
    ///
    /// # Errors
    /// * [`EnrollmentError::NotFound`]: unknown student or course.
    /// * [`EnrollmentError::DuplicateEnrollment`]: already held.
    /// * [`EnrollmentError::SelectionOutOfBounds`]: the student already holds the maximum.
    /// * [`EnrollmentError::CapacityExceeded`]: no seat left.
    pub fn enroll(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<CourseOffering, EnrollmentError> {
        let mut guard = self.state.write();
        let LedgerState { courses, students, revision } = &mut *guard;

        let holder = students.get_mut(student).ok_or_else(|| EnrollmentError::not_found("student", student))?;
        let offering = courses.get_mut(course).ok_or_else(|| EnrollmentError::not_found("course", course))?;

        if holder.holds(course) {
            return Err(EnrollmentError::DuplicateEnrollment {
                message: format!("student '{student}' already holds '{course}'").into(),
                context: None,
            });
        }
        if holder.courses.len() >= self.limits.max() {
            return Err(EnrollmentError::SelectionOutOfBounds {
                message: format!("student '{student}' already holds {} courses", holder.courses.len()).into(),
                context: None,
            });
        }
        if offering.is_full() {
            warn!(student = %student, course = %course, capacity = offering.capacity, "Enrollment rejected: course full");
            return Err(EnrollmentError::CapacityExceeded {
                message: format!("'{course}' has {} of {} seats taken", offering.enrolled, offering.capacity).into(),
                context: None,
            });
        }

        offering.enrolled += 1;
        holder.courses.insert(course.clone(), today());
        *revision += 1;

        info!(student = %student, course = %course, remaining = offering.remaining(), "Enrolled");
        Ok(offering.clone())
    }

    /// Releases the seat `student` holds in `course`.
    ///
    /// # Errors
    /// * [`EnrollmentError::NotFound`]: unknown student or course.
    /// * [`EnrollmentError::InvariantViolation`]: the course is not held, or its
    ///   counter is already zero. Nothing is mutated in either case.
    pub fn drop_course(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<CourseOffering, EnrollmentError> {
        let mut guard = self.state.write();
        let LedgerState { courses, students, revision } = &mut *guard;

        let holder = students.get_mut(student).ok_or_else(|| EnrollmentError::not_found("student", student))?;
        let offering = courses.get_mut(course).ok_or_else(|| EnrollmentError::not_found("course", course))?;

        if !holder.holds(course) {
            return Err(EnrollmentError::InvariantViolation {
                message: format!("student '{student}' does not hold '{course}'").into(),
                context: None,
            });
        }
        let Some(enrolled) = offering.enrolled.checked_sub(1) else {
            warn!(student = %student, course = %course, "Drop rejected: counter already zero");
            return Err(EnrollmentError::InvariantViolation {
                message: format!("'{course}' has no enrolled students to release").into(),
                context: None,
            });
        };

        offering.enrolled = enrolled;
        holder.courses.remove(course);
        *revision += 1;

        info!(student = %student, course = %course, remaining = offering.remaining(), "Dropped");
        Ok(offering.clone())
    }

    /// Replaces the student's whole selection in one step.
    ///
    /// Courses kept from the current set keep their seat and enrollment date,
    /// removed ones release a seat, new ones take one. Either everything is
    /// applied or nothing is.
    ///
    /// # Errors
    /// Checked in this order:
    /// * [`EnrollmentError::NotFound`]: unknown student.
    /// * [`EnrollmentError::SelectionOutOfBounds`]: list length outside the limits.
    /// * [`EnrollmentError::DuplicateEnrollment`]: an id listed twice.
    /// * [`EnrollmentError::NotFound`]: unknown course.
    /// * [`EnrollmentError::CapacityExceeded`]: a newly added course is full.
    /// * [`EnrollmentError::InvariantViolation`]: a released course counter is zero.
    pub fn submit(
        &self,
        student: &StudentId,
        course_ids: &[CourseId],
    ) -> Result<SubmitOutcome, EnrollmentError> {
        let mut guard = self.state.write();
        let LedgerState { courses, students, revision } = &mut *guard;

        let holder = students.get_mut(student).ok_or_else(|| EnrollmentError::not_found("student", student))?;

        if !self.limits.contains(course_ids.len()) {
            return Err(EnrollmentError::SelectionOutOfBounds {
                message: format!("{} courses submitted, expected {}", course_ids.len(), self.limits).into(),
                context: None,
            });
        }

        let mut wanted = BTreeSet::new();
        for id in course_ids {
            if !wanted.insert(id) {
                return Err(EnrollmentError::DuplicateEnrollment {
                    message: format!("'{id}' listed more than once").into(),
                    context: None,
                });
            }
        }
        for id in course_ids {
            if !courses.contains_key(id) {
                return Err(EnrollmentError::not_found("course", id));
            }
        }

        let added: Vec<CourseId> = wanted.iter().filter(|id| !holder.holds(id)).map(|id| (*id).clone()).collect();
        let removed: Vec<CourseId> = holder.course_ids().filter(|id| !wanted.contains(id)).cloned().collect();

        for id in &added {
            if courses.get(id).is_some_and(CourseOffering::is_full) {
                warn!(student = %student, course = %id, "Submit rejected: course full");
                return Err(EnrollmentError::CapacityExceeded {
                    message: format!("'{id}' has no seats left").into(),
                    context: None,
                });
            }
        }
        for id in &removed {
            if courses.get(id).is_none_or(|course| course.enrolled == 0) {
                return Err(EnrollmentError::InvariantViolation {
                    message: format!("'{id}' has no enrolled students to release").into(),
                    context: None,
                });
            }
        }

        let date = today();
        for id in &removed {
            if let Some(course) = courses.get_mut(id) {
                course.enrolled -= 1;
            }
            holder.courses.remove(id);
        }
        for id in &added {
            if let Some(course) = courses.get_mut(id) {
                course.enrolled += 1;
            }
            holder.courses.insert(id.clone(), date);
        }
        *revision += 1;

        info!(
            student = %student,
            added = added.len(),
            removed = removed.len(),
            total = holder.courses.len(),
            "Selection submitted"
        );
        Ok(SubmitOutcome {
            student: student.clone(),
            courses: holder.course_ids().cloned().collect(),
            added,
            removed,
        })
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn validate_offering(course: &CourseOffering) -> Result<(), EnrollmentError> {
    let verified = IdentGuard::verify(course.id.as_str(), "course")?;
    if verified != course.id.as_str() {
        return Err(EnrollmentError::validation(format!("course id '{}' has surrounding whitespace", course.id)));
    }
    if course.title.trim().is_empty() {
        return Err(EnrollmentError::validation(format!("course '{}' has no title", course.id)));
    }
    if course.enrolled > course.capacity {
        return Err(EnrollmentError::validation(format!(
            "course '{}' has {} enrolled over a capacity of {}",
            course.id, course.enrolled, course.capacity
        )));
    }
    Ok(())
}

fn normalize_profile(profile: StudentProfile) -> Result<StudentProfile, EnrollmentError> {
    let required = |value: String, field: &'static str| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EnrollmentError::validation(format!("{field} is required")))
        } else {
            Ok(trimmed.to_owned())
        }
    };

    let email = required(profile.email, "email")?;
    if !email.split_once('@').is_some_and(|(user, host)| !user.is_empty() && host.contains('.')) {
        return Err(EnrollmentError::validation(format!("'{email}' is not an e-mail address")));
    }

    Ok(StudentProfile {
        first_name: required(profile.first_name, "firstName")?,
        last_name: required(profile.last_name, "lastName")?,
        student_number: IdentGuard::verify(profile.student_number, "student number")?,
        email,
        department: required(profile.department, "department")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offering(id: &str, slot: &str, capacity: u32) -> CourseOffering {
        CourseOffering {
            id: id.into(),
            title: format!("{id} title"),
            department: "CS".to_owned(),
            time_slot: slot.into(),
            capacity,
            enrolled: 0,
            credits: 5,
        }
    }

    fn profile(number: &str) -> StudentProfile {
        StudentProfile {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            student_number: number.to_owned(),
            email: format!("{number}@uni.example"),
            department: "CS".to_owned(),
        }
    }

    fn ledger(capacity: u32) -> EnrollmentLedger {
        let catalog = (0..8).map(|i| offering(&format!("C{i}"), &format!("Slot {i}"), capacity)).collect();
        EnrollmentLedger::with_catalog(catalog, SelectionLimits::default()).unwrap()
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<CourseId> {
        range.map(|i| CourseId::from(format!("C{i}"))).collect()
    }

    #[test]
    fn last_seat_goes_to_the_first_student() {
        let ledger = ledger(1);
        let a = ledger.register_student(profile("S1")).unwrap().id;
        let b = ledger.register_student(profile("S2")).unwrap().id;

        let course = ledger.enroll(&a, &"C0".into()).unwrap();
        assert_eq!((course.enrolled, course.remaining()), (1, 0));

        let err = ledger.enroll(&b, &"C0".into()).unwrap_err();
        assert!(matches!(err, EnrollmentError::CapacityExceeded { .. }));
        assert!(ledger.student(&b).unwrap().courses.is_empty());
    }

    #[test]
    fn enroll_then_drop_restores_state() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;
        let before = ledger.course(&"C1".into()).unwrap();

        ledger.enroll(&s, &"C1".into()).unwrap();
        let after = ledger.drop_course(&s, &"C1".into()).unwrap();

        assert_eq!(after, before);
        assert!(ledger.student(&s).unwrap().courses.is_empty());
    }

    #[test]
    fn second_enroll_is_a_duplicate() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;
        ledger.enroll(&s, &"C1".into()).unwrap();

        let err = ledger.enroll(&s, &"C1".into()).unwrap_err();
        assert!(matches!(err, EnrollmentError::DuplicateEnrollment { .. }));
        assert_eq!(ledger.course(&"C1".into()).unwrap().enrolled, 1);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;

        assert!(matches!(ledger.enroll(&"ghost".into(), &"C1".into()), Err(EnrollmentError::NotFound { .. })));
        assert!(matches!(ledger.enroll(&s, &"NOPE".into()), Err(EnrollmentError::NotFound { .. })));
        assert!(matches!(ledger.roster(&"NOPE".into()), Err(EnrollmentError::NotFound { .. })));
    }

    #[test]
    fn dropping_an_unheld_course_mutates_nothing() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;
        let revision = ledger.revision();

        let err = ledger.drop_course(&s, &"C2".into()).unwrap_err();
        assert!(matches!(err, EnrollmentError::InvariantViolation { .. }));
        assert_eq!(ledger.revision(), revision);
        assert_eq!(ledger.course(&"C2".into()).unwrap().enrolled, 0);
    }

    #[test]
    fn enroll_stops_at_max_courses() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;
        for id in ids(0..7) {
            ledger.enroll(&s, &id).unwrap();
        }

        let err = ledger.enroll(&s, &"C7".into()).unwrap_err();
        assert!(matches!(err, EnrollmentError::SelectionOutOfBounds { .. }));
    }

    #[test]
    fn submit_replaces_the_selection() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;
        ledger.submit(&s, &ids(0..6)).unwrap();

        let outcome = ledger.submit(&s, &ids(1..8)).unwrap();
        assert_eq!(outcome.added, ids(6..8));
        assert_eq!(outcome.removed, ids(0..1));
        assert_eq!(outcome.courses, ids(1..8));
        assert_eq!(ledger.course(&"C0".into()).unwrap().enrolled, 0);
        assert_eq!(ledger.course(&"C7".into()).unwrap().enrolled, 1);
    }

    #[test]
    fn submit_is_all_or_nothing() {
        let ledger = ledger(1);
        let a = ledger.register_student(profile("S1")).unwrap().id;
        let b = ledger.register_student(profile("S2")).unwrap().id;
        ledger.enroll(&a, &"C5".into()).unwrap();
        let before = ledger.snapshot();

        let err = ledger.submit(&b, &ids(0..6)).unwrap_err();
        assert!(matches!(err, EnrollmentError::CapacityExceeded { .. }));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn submit_checks_bounds_then_duplicates_then_existence() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;

        let short = ledger.submit(&s, &ids(0..5)).unwrap_err();
        assert!(matches!(short, EnrollmentError::SelectionOutOfBounds { .. }));

        let mut doubled = ids(0..5);
        doubled.push("C0".into());
        let dup = ledger.submit(&s, &doubled).unwrap_err();
        assert!(matches!(dup, EnrollmentError::DuplicateEnrollment { .. }));

        let mut unknown = ids(0..5);
        unknown.push("NOPE".into());
        let missing = ledger.submit(&s, &unknown).unwrap_err();
        assert!(matches!(missing, EnrollmentError::NotFound { .. }));
    }

    #[test]
    fn duplicate_student_numbers_are_rejected() {
        let ledger = ledger(3);
        ledger.register_student(profile("S1")).unwrap();

        let err = ledger.register_student(profile("S1")).unwrap_err();
        assert!(matches!(err, EnrollmentError::Validation { .. }));
    }

    #[test]
    fn profiles_are_trimmed_and_checked() {
        let ledger = ledger(3);
        let mut raw = profile("S9");
        raw.first_name = "  Grace ".to_owned();
        assert_eq!(ledger.register_student(raw).unwrap().profile.first_name, "Grace");

        let mut bad = profile("S10");
        bad.email = "nobody".to_owned();
        assert!(matches!(ledger.register_student(bad), Err(EnrollmentError::Validation { .. })));
    }

    #[test]
    fn roster_lists_holders() {
        let ledger = ledger(3);
        let a = ledger.register_student(profile("S1")).unwrap().id;
        ledger.register_student(profile("S2")).unwrap();
        ledger.enroll(&a, &"C3".into()).unwrap();

        let roster = ledger.roster(&"C3".into()).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].student, a);
        assert_eq!(roster[0].name, "Ada Lovelace");
    }

    #[test]
    fn department_filter_is_case_insensitive() {
        let mut catalog = vec![offering("CS1", "a", 1), offering("MA1", "b", 1)];
        catalog[1].department = "Math".to_owned();
        let ledger = EnrollmentLedger::with_catalog(catalog, SelectionLimits::default()).unwrap();

        assert_eq!(ledger.courses(None).len(), 2);
        let math = ledger.courses(Some("MATH"));
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].id, CourseId::from("MA1"));
    }

    #[test]
    fn snapshot_roundtrip_preserves_state() {
        let ledger = ledger(3);
        let s = ledger.register_student(profile("S1")).unwrap().id;
        ledger.enroll(&s, &"C0".into()).unwrap();

        let restored = EnrollmentLedger::from_snapshot(ledger.snapshot(), ledger.limits()).unwrap();
        assert_eq!(restored.snapshot(), ledger.snapshot());
    }

    #[test]
    fn inconsistent_snapshots_are_rejected() {
        let mut over = offering("C0", "a", 1);
        over.enrolled = 2;
        assert!(EnrollmentLedger::with_catalog(vec![over], SelectionLimits::default()).is_err());

        let dup = vec![offering("C0", "a", 1), offering("C0", "b", 1)];
        assert!(EnrollmentLedger::with_catalog(dup, SelectionLimits::default()).is_err());

        let mut drifted = offering("C0", "a", 5);
        drifted.enrolled = 1;
        let err = EnrollmentLedger::with_catalog(vec![drifted], SelectionLimits::default()).unwrap_err();
        assert!(err.to_string().contains("0 students hold it"));
    }

    #[test]
    fn padded_student_ids_are_rejected_on_restore() {
        let ledger = ledger(3);
        ledger.register_student(profile("S1")).unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.students[0].id = format!(" {}", snapshot.students[0].id).into();

        let err = EnrollmentLedger::from_snapshot(snapshot, ledger.limits()).unwrap_err();
        assert!(matches!(err, EnrollmentError::Validation { .. }), "{err}");
        assert!(err.to_string().contains("surrounding whitespace"));
    }
}
