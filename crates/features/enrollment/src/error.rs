use std::borrow::Cow;
use unireg_kernel::ident::IdentError;
use unireg_storage::StorageError;

#[unireg_derive::unireg_error]
pub enum EnrollmentError {
    /// Unknown student or course.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Course is full{}: {message}", format_context(.context))]
    CapacityExceeded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Duplicate enrollment{}: {message}", format_context(.context))]
    DuplicateEnrollment { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The request contradicts the ledger state (e.g. dropping an unheld course).
    #[error("Invariant violation{}: {message}", format_context(.context))]
    InvariantViolation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Selection out of bounds{}: {message}", format_context(.context))]
    SelectionOutOfBounds { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Malformed catalog, snapshot or request data.
    #[error("Validation failed{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Snapshot storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Snapshot encoding failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl EnrollmentError {
    /// Stable machine-readable code carried in API error bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::DuplicateEnrollment { .. } => "DUPLICATE_ENROLLMENT",
            Self::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            Self::SelectionOutOfBounds { .. } => "SELECTION_OUT_OF_BOUNDS",
            Self::Validation { .. } => "VALIDATION",
            Self::Storage { .. } | Self::Serialization { .. } | Self::Internal { .. } => "INTERNAL",
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound { message: format!("{kind} '{id}'").into(), context: None }
    }

    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}

impl From<IdentError> for EnrollmentError {
    fn from(err: IdentError) -> Self {
        Self::Validation { message: err.to_string().into(), context: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_for_domain_failures() {
        let errors = [
            EnrollmentError::not_found("course", "CS101"),
            EnrollmentError::CapacityExceeded { message: "CS101".into(), context: None },
            EnrollmentError::DuplicateEnrollment { message: "CS101".into(), context: None },
            EnrollmentError::InvariantViolation { message: "CS101".into(), context: None },
            EnrollmentError::SelectionOutOfBounds { message: "8".into(), context: None },
            EnrollmentError::validation("bad"),
        ];
        let codes: std::collections::BTreeSet<_> = errors.iter().map(EnrollmentError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn context_is_rendered() {
        let err: Result<(), _> = Err(EnrollmentError::not_found("student", "s-1"));
        let err = err.context("enroll").unwrap_err();
        assert_eq!(err.to_string(), "Not found (enroll): student 's-1'");
    }

    #[test]
    fn plain_strings_become_internal() {
        let err = EnrollmentError::from("lock poisoned");
        assert_eq!(err.code(), "INTERNAL");
    }
}
