use crate::EnrollmentInner;
use crate::error::EnrollmentError;
use crate::events::EnrollmentEvent;
use crate::ledger::SubmitOutcome;
use crate::model::{CourseId, CourseOffering, Student, StudentId, StudentProfile};
use crate::planner::Admission;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, warn};

/// Advisory answer for "may I add this course to this selection?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCheck {
    pub admission: Admission,
    /// Whether the selection as given (without the candidate) may be submitted.
    pub can_submit: bool,
    pub total_credits: u32,
    pub selected: usize,
}

impl EnrollmentInner {
    pub async fn register_student(&self, profile: StudentProfile) -> Result<Student, EnrollmentError> {
        let student = self.ledger.register_student(profile)?;
        self.committed(EnrollmentEvent::StudentRegistered { student: student.id.clone() }).await;
        Ok(student)
    }

    pub async fn enroll(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<CourseOffering, EnrollmentError> {
        let offering = self.ledger.enroll(student, course)?;
        self.committed(EnrollmentEvent::Enrolled {
            student: student.clone(),
            course: course.clone(),
            remaining: offering.remaining(),
        })
        .await;
        Ok(offering)
    }

    pub async fn drop_course(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<CourseOffering, EnrollmentError> {
        let offering = self.ledger.drop_course(student, course)?;
        self.committed(EnrollmentEvent::Dropped {
            student: student.clone(),
            course: course.clone(),
            remaining: offering.remaining(),
        })
        .await;
        Ok(offering)
    }

    pub async fn submit(
        &self,
        student: &StudentId,
        courses: &[CourseId],
    ) -> Result<SubmitOutcome, EnrollmentError> {
        let outcome = self.ledger.submit(student, courses)?;
        self.committed(EnrollmentEvent::Submitted {
            student: outcome.student.clone(),
            added: outcome.added.clone(),
            removed: outcome.removed.clone(),
        })
        .await;
        Ok(outcome)
    }

    /// Runs the planner against live seat counts without changing anything.
    ///
    /// Every id in `selection` must be a distinct catalog course other than
    /// `candidate`, so all reported figures count the same selection.
    ///
    /// # Errors
    /// * [`EnrollmentError::NotFound`]: `candidate` or a selected id is not in the catalog.
    /// * [`EnrollmentError::DuplicateEnrollment`]: an id listed twice, or the candidate
    ///   already in the selection.
    pub fn check(
        &self,
        candidate: &CourseId,
        selection: &[CourseId],
    ) -> Result<RegistrationCheck, EnrollmentError> {
        let course = self.ledger.course(candidate)?;
        let catalog = self.ledger.courses(None);

        let mut seen = BTreeSet::new();
        let mut selected = Vec::with_capacity(selection.len());
        for id in selection {
            if id == candidate || !seen.insert(id) {
                return Err(EnrollmentError::DuplicateEnrollment {
                    message: format!("'{id}' is already in the selection").into(),
                    context: Some("check".into()),
                });
            }
            let offering = catalog
                .iter()
                .find(|c| &c.id == id)
                .ok_or_else(|| EnrollmentError::not_found("course", id))?;
            selected.push(offering.clone());
        }

        Ok(RegistrationCheck {
            admission: self.planner.can_add(&course, &selected),
            can_submit: self.planner.can_submit(selected.len()),
            total_credits: self.planner.total_credits(selection, &catalog),
            selected: selected.len(),
        })
    }

    /// Writes a snapshot now, regardless of the per-commit writes.
    pub async fn flush(&self) -> Result<(), EnrollmentError> {
        match &self.store {
            Some(store) => store.save(&self.ledger).await,
            None => Ok(()),
        }
    }

    /// Subscribes to committed changes.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<Arc<EnrollmentEvent>>, EnrollmentError> {
        self.events.subscribe::<EnrollmentEvent>().map_err(|e| EnrollmentError::Internal {
            message: e.to_string().into(),
            context: Some("event bus".into()),
        })
    }

    /// Post-commit work. The in-memory commit already stands, so failures here
    /// are logged and the next successful snapshot catches up.
    async fn committed(&self, event: EnrollmentEvent) {
        if let Err(e) = self.events.publish(event) {
            warn!(error = %e, "Enrollment event not published");
        }
        if let Some(store) = &self.store
            && let Err(e) = store.save(&self.ledger).await
        {
            error!(error = %e, revision = self.ledger.revision(), "Ledger snapshot failed");
        }
    }
}
