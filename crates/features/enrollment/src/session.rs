//! Client-side registration state.
//!
//! A session holds a catalog copy and the courses a student is considering.
//! Toggling runs the planner rules; nothing reaches the ledger until
//! [`RegistrationSession::submit_to`], where every rule is checked again.

use crate::error::EnrollmentError;
use crate::ledger::{EnrollmentLedger, SubmitOutcome};
use crate::model::{CourseId, CourseOffering, StudentId};
use crate::planner::{Admission, RegistrationPlanner};

/// Result of [`RegistrationSession::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    Rejected(Admission),
}

#[derive(Debug, Clone)]
pub struct RegistrationSession {
    planner: RegistrationPlanner,
    catalog: Vec<CourseOffering>,
    selected: Vec<CourseId>,
}

impl RegistrationSession {
    #[must_use]
    pub const fn new(planner: RegistrationPlanner, catalog: Vec<CourseOffering>) -> Self {
        Self { planner, catalog, selected: Vec::new() }
    }

    /// Opens a session on the live catalog, pre-selecting what `student` holds.
    pub fn for_student(ledger: &EnrollmentLedger, student: &StudentId) -> Result<Self, EnrollmentError> {
        let held = ledger.student(student)?;
        Ok(Self {
            planner: RegistrationPlanner::new(ledger.limits()),
            catalog: ledger.courses(None),
            selected: held.course_ids().cloned().collect(),
        })
    }

    /// Adds `course` when the planner allows it, or removes it if already selected.
    ///
    /// # Errors
    /// [`EnrollmentError::NotFound`] when the course is not in the catalog.
    pub fn toggle(&mut self, course: &CourseId) -> Result<Toggle, EnrollmentError> {
        let offering = self
            .catalog
            .iter()
            .find(|c| &c.id == course)
            .ok_or_else(|| EnrollmentError::not_found("course", course))?;

        if let Some(pos) = self.selected.iter().position(|id| id == course) {
            self.selected.remove(pos);
            return Ok(Toggle::Removed);
        }

        match self.planner.can_add(offering, &self.selection()) {
            Admission::Allowed => {
                self.selected.push(course.clone());
                Ok(Toggle::Added)
            },
            rejected => Ok(Toggle::Rejected(rejected)),
        }
    }

    #[must_use]
    pub fn is_selected(&self, course: &CourseId) -> bool {
        self.selected.contains(course)
    }

    #[must_use]
    pub const fn selected_count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn selected(&self) -> &[CourseId] {
        &self.selected
    }

    #[must_use]
    pub fn total_credits(&self) -> u32 {
        self.planner.total_credits(&self.selected, &self.catalog)
    }

    #[must_use]
    pub const fn can_submit(&self) -> bool {
        self.planner.can_submit(self.selected.len())
    }

    /// Catalog entries of one department, or all of them for `None`.
    pub fn filtered<'a>(&'a self, department: Option<&'a str>) -> impl Iterator<Item = &'a CourseOffering> {
        self.catalog.iter().filter(move |c| department.is_none_or(|dept| c.in_department(dept)))
    }

    /// Reloads seat counts from the ledger; the selection is kept.
    pub fn refresh(&mut self, ledger: &EnrollmentLedger) {
        self.catalog = ledger.courses(None);
    }

    /// Hands the selection to the ledger.
    ///
    /// # Errors
    /// [`EnrollmentError::SelectionOutOfBounds`] without contacting the ledger
    /// when [`Self::can_submit`] is false, otherwise whatever
    /// [`EnrollmentLedger::submit`] reports.
    pub fn submit_to(
        &self,
        ledger: &EnrollmentLedger,
        student: &StudentId,
    ) -> Result<SubmitOutcome, EnrollmentError> {
        if !self.can_submit() {
            return Err(EnrollmentError::SelectionOutOfBounds {
                message: format!("{} selected, expected {}", self.selected.len(), self.planner.limits()).into(),
                context: Some("session".into()),
            });
        }
        ledger.submit(student, &self.selected)
    }

    fn selection(&self) -> Vec<CourseOffering> {
        self.selected
            .iter()
            .filter_map(|id| self.catalog.iter().find(|c| &c.id == id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StudentProfile;
    use crate::planner::SelectionLimits;

    fn catalog() -> Vec<CourseOffering> {
        [("CS101", "Mon 09:00", 10), ("CS102", "Mon 09:00", 10), ("MA101", "Tue 09:00", 0), ("PH101", "Wed 09:00", 10)]
            .into_iter()
            .map(|(id, slot, capacity)| CourseOffering {
                id: id.into(),
                title: id.to_owned(),
                department: id[..2].to_owned(),
                time_slot: slot.into(),
                capacity,
                enrolled: 0,
                credits: 3,
            })
            .collect()
    }

    fn session(max: usize) -> RegistrationSession {
        RegistrationSession::new(RegistrationPlanner::new(SelectionLimits::new(1, max).unwrap()), catalog())
    }

    /// Ledger over the test catalog with a single PH101 seat and a 2..=3 window.
    fn ledger() -> EnrollmentLedger {
        let mut courses = catalog();
        if let Some(ph) = courses.iter_mut().find(|c| c.id.as_str() == "PH101") {
            ph.capacity = 1;
        }
        EnrollmentLedger::with_catalog(courses, SelectionLimits::new(2, 3).unwrap()).unwrap()
    }

    fn register(ledger: &EnrollmentLedger, number: &str) -> StudentId {
        ledger
            .register_student(StudentProfile {
                first_name: "Grace".to_owned(),
                last_name: "Hopper".to_owned(),
                student_number: number.to_owned(),
                email: format!("{number}@uni.example"),
                department: "CS".to_owned(),
            })
            .unwrap()
            .id
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut s = session(3);
        assert_eq!(s.toggle(&"CS101".into()).unwrap(), Toggle::Added);
        assert!(s.is_selected(&"CS101".into()));
        assert_eq!(s.total_credits(), 3);

        assert_eq!(s.toggle(&"CS101".into()).unwrap(), Toggle::Removed);
        assert_eq!(s.selected_count(), 0);
    }

    #[test]
    fn toggle_reports_planner_rejections() {
        let mut s = session(3);
        s.toggle(&"CS101".into()).unwrap();

        assert_eq!(
            s.toggle(&"CS102".into()).unwrap(),
            Toggle::Rejected(Admission::TimeConflict { conflicting: "CS101".into() })
        );
        assert_eq!(s.toggle(&"MA101".into()).unwrap(), Toggle::Rejected(Admission::CourseFull));
        assert!(matches!(s.toggle(&"XX999".into()), Err(EnrollmentError::NotFound { .. })));
    }

    #[test]
    fn max_courses_blocks_further_adds() {
        let mut s = session(1);
        s.toggle(&"PH101".into()).unwrap();
        assert_eq!(s.toggle(&"CS101".into()).unwrap(), Toggle::Rejected(Admission::AlreadyMaxCourses));
        assert!(s.can_submit());
    }

    #[test]
    fn filter_by_department() {
        let s = session(3);
        let cs: Vec<_> = s.filtered(Some("cs")).map(|c| c.id.as_str()).collect();
        assert_eq!(cs, ["CS101", "CS102"]);
        assert_eq!(s.filtered(None).count(), 4);
    }

    #[test]
    fn for_student_preselects_held_courses() {
        let ledger = ledger();
        let student = register(&ledger, "S1");
        ledger.enroll(&student, &"CS101".into()).unwrap();

        let s = RegistrationSession::for_student(&ledger, &student).unwrap();
        assert!(s.is_selected(&"CS101".into()));
        assert_eq!(s.selected_count(), 1);
        assert!(!s.can_submit());
        assert!(matches!(
            RegistrationSession::for_student(&ledger, &"nobody".into()),
            Err(EnrollmentError::NotFound { .. })
        ));
    }

    #[test]
    fn refresh_sees_seats_taken_by_others() {
        let ledger = ledger();
        let first = register(&ledger, "S1");
        let second = register(&ledger, "S2");
        let mut s = RegistrationSession::for_student(&ledger, &first).unwrap();

        ledger.enroll(&second, &"PH101".into()).unwrap();
        s.refresh(&ledger);

        assert_eq!(s.toggle(&"PH101".into()).unwrap(), Toggle::Rejected(Admission::CourseFull));
        assert_eq!(s.selected_count(), 0);
    }

    #[test]
    fn submit_to_checks_size_before_the_ledger() {
        let ledger = ledger();
        let student = register(&ledger, "S1");
        let mut s = RegistrationSession::for_student(&ledger, &student).unwrap();
        s.toggle(&"CS101".into()).unwrap();

        let revision = ledger.revision();
        let err = s.submit_to(&ledger, &student).unwrap_err();
        assert!(matches!(err, EnrollmentError::SelectionOutOfBounds { .. }), "{err}");
        assert!(err.to_string().contains("(session)"));
        assert_eq!(ledger.revision(), revision);
        assert_eq!(ledger.student(&student).unwrap().course_ids().count(), 0);

        assert_eq!(s.toggle(&"PH101".into()).unwrap(), Toggle::Added);
        let outcome = s.submit_to(&ledger, &student).unwrap();
        assert_eq!(outcome.courses, [CourseId::from("CS101"), CourseId::from("PH101")]);
        assert!(ledger.revision() > revision);
        assert_eq!(ledger.course(&"PH101".into()).unwrap().enrolled, 1);
    }
}
