//! Hygiene for identifiers arriving from clients and seed files.

use std::borrow::Cow;

pub const MAX_IDENT_LEN: usize = 64;

#[unireg_derive::unireg_error]
pub enum IdentError {
    #[error("Invalid identifier{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Validates opaque identifiers such as course codes and student ids.
#[derive(Debug)]
pub struct IdentGuard;

impl IdentGuard {
    /// Trims `raw` and checks it is 1..=64 characters of `[A-Za-z0-9_.-]`.
    ///
    /// `kind` only labels the error (`"course"`, `"student"`).
    pub fn verify(raw: impl AsRef<str>, kind: &'static str) -> Result<String, IdentError> {
        let id = raw.as_ref().trim();

        if id.is_empty() {
            return Err(IdentError::Invalid { message: "empty".into(), context: Some(kind.into()) });
        }
        if id.len() > MAX_IDENT_LEN {
            return Err(IdentError::Invalid {
                message: format!("longer than {MAX_IDENT_LEN} characters").into(),
                context: Some(kind.into()),
            });
        }
        if let Some(bad) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || "_.-".contains(*c))) {
            return Err(IdentError::Invalid {
                message: format!("unexpected character {bad:?} in '{id}'").into(),
                context: Some(kind.into()),
            });
        }

        Ok(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_course_codes() {
        assert_eq!(IdentGuard::verify("  CS-101 ", "course").unwrap(), "CS-101");
        assert_eq!(IdentGuard::verify("mth_2.1", "course").unwrap(), "mth_2.1");
    }

    #[test]
    fn rejects_empty_long_and_odd_input() {
        assert!(IdentGuard::verify("   ", "student").is_err());
        assert!(IdentGuard::verify("a".repeat(MAX_IDENT_LEN + 1), "student").is_err());
        assert!(IdentGuard::verify("CS 101", "course").is_err());
        assert!(IdentGuard::verify("../etc", "course").is_err());
    }

    #[test]
    fn error_names_the_kind() {
        let err = IdentGuard::verify("", "student").unwrap_err();
        assert_eq!(err.to_string(), "Invalid identifier (student): empty");
    }
}
