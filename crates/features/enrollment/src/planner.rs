//! Advisory checks used while a student assembles a selection.
//!
//! Nothing here mutates state or is trusted by the ledger; it only predicts
//! what [`EnrollmentLedger`](crate::ledger::EnrollmentLedger) will accept so a
//! client can explain a rejection before submitting.

use crate::error::EnrollmentError;
use crate::model::{CourseId, CourseOffering};
use std::fmt;

/// Inclusive bounds on how many courses a submitted selection may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    min: usize,
    max: usize,
}

impl SelectionLimits {
    /// # Errors
    /// [`EnrollmentError::Validation`] unless `1 <= max` and `min <= max`.
    pub fn new(min: usize, max: usize) -> Result<Self, EnrollmentError> {
        if max == 0 || min > max {
            return Err(EnrollmentError::validation(format!(
                "selection bounds must satisfy min <= max and max > 0 (got {min}..={max})"
            )));
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }

    #[must_use]
    pub const fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self { min: 6, max: 7 }
    }
}

impl fmt::Display for SelectionLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Outcome of [`RegistrationPlanner::can_add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    AlreadyMaxCourses,
    CourseFull,
    TimeConflict { conflicting: CourseId },
}

impl Admission {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::AlreadyMaxCourses => "ALREADY_MAX_COURSES",
            Self::CourseFull => "COURSE_FULL",
            Self::TimeConflict { .. } => "TIME_CONFLICT",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationPlanner {
    limits: SelectionLimits,
}

impl RegistrationPlanner {
    #[must_use]
    pub const fn new(limits: SelectionLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> SelectionLimits {
        self.limits
    }

    /// Decides whether `course` may join `selection`.
    ///
    /// Rules run in order and the first failure wins: selection size, seat
    /// availability, then time slot. Any selected course with the identical slot
    /// string clashes, the first one found is named.
    #[must_use]
    pub fn can_add(&self, course: &CourseOffering, selection: &[CourseOffering]) -> Admission {
        if selection.len() >= self.limits.max {
            return Admission::AlreadyMaxCourses;
        }
        if course.is_full() {
            return Admission::CourseFull;
        }
        selection
            .iter()
            .find(|held| held.time_slot == course.time_slot)
            .map_or(Admission::Allowed, |held| Admission::TimeConflict {
                conflicting: held.id.clone(),
            })
    }

    #[must_use]
    pub const fn can_submit(&self, selected: usize) -> bool {
        self.limits.contains(selected)
    }

    /// Sums the credits of `selection`; ids absent from `catalog` count as zero.
    #[must_use]
    pub fn total_credits<'a>(
        &self,
        selection: impl IntoIterator<Item = &'a CourseId>,
        catalog: &[CourseOffering],
    ) -> u32 {
        selection
            .into_iter()
            .filter_map(|id| catalog.iter().find(|course| &course.id == id))
            .fold(0, |sum, course| sum.saturating_add(course.credits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, slot: &str, capacity: u32, enrolled: u32) -> CourseOffering {
        CourseOffering {
            id: id.into(),
            title: format!("{id} title"),
            department: "CS".to_owned(),
            time_slot: slot.into(),
            capacity,
            enrolled,
            credits: 5,
        }
    }

    fn distinct_selection(n: usize) -> Vec<CourseOffering> {
        (0..n).map(|i| course(&format!("C{i}"), &format!("Slot {i}"), 10, 0)).collect()
    }

    #[test]
    fn eighth_course_is_rejected_before_anything_else() {
        let planner = RegistrationPlanner::default();
        let selection = distinct_selection(7);
        // Full and clashing with C0, yet the size rule wins.
        let candidate = course("X", "Slot 0", 1, 1);
        assert_eq!(planner.can_add(&candidate, &selection), Admission::AlreadyMaxCourses);
    }

    #[test]
    fn full_course_beats_time_conflict() {
        let planner = RegistrationPlanner::default();
        let selection = distinct_selection(2);
        let candidate = course("X", "Slot 1", 3, 3);
        assert_eq!(planner.can_add(&candidate, &selection), Admission::CourseFull);
    }

    #[test]
    fn identical_slot_names_the_first_clash() {
        let planner = RegistrationPlanner::default();
        let selection = vec![
            course("CS101", "Mon/Wed 09:00-10:30", 10, 0),
            course("MA101", "Mon/Wed 09:00-10:30", 10, 0),
        ];
        let candidate = course("PH101", "Mon/Wed 09:00-10:30", 10, 0);
        assert_eq!(
            planner.can_add(&candidate, &selection),
            Admission::TimeConflict { conflicting: "CS101".into() }
        );
    }

    #[test]
    fn overlapping_but_different_strings_do_not_clash() {
        let planner = RegistrationPlanner::default();
        let selection = vec![course("CS101", "Mon/Wed 09:00-10:30", 10, 0)];
        let candidate = course("MA101", "Mon/Wed 09:30-11:00", 10, 0);
        assert!(planner.can_add(&candidate, &selection).is_allowed());
    }

    #[test]
    fn slot_equality_alone_decides_a_clash() {
        let planner = RegistrationPlanner::default();
        let candidate = course("CS101", "Mon 09:00", 10, 0);
        let selection = vec![course("PH101", "Tue 09:00", 10, 0), candidate.clone()];
        assert_eq!(
            planner.can_add(&candidate, &selection),
            Admission::TimeConflict { conflicting: "CS101".into() }
        );
    }

    #[test]
    fn submit_window_is_six_to_seven() {
        let planner = RegistrationPlanner::default();
        let verdicts: Vec<bool> = (5..=8).map(|n| planner.can_submit(n)).collect();
        assert_eq!(verdicts, [false, true, true, false]);
    }

    #[test]
    fn credits_skip_unknown_ids() {
        let planner = RegistrationPlanner::default();
        let catalog = vec![course("A", "1", 5, 0), course("B", "2", 5, 0)];
        let selection: Vec<CourseId> = vec!["A".into(), "GHOST".into(), "B".into()];
        assert_eq!(planner.total_credits(&selection, &catalog), 10);
    }

    #[test]
    fn limits_reject_inverted_bounds() {
        assert!(SelectionLimits::new(8, 7).is_err());
        assert!(SelectionLimits::new(0, 0).is_err());
        assert_eq!(SelectionLimits::new(1, 3).unwrap().to_string(), "1..=3");
    }
}
