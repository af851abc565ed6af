use std::borrow::Cow;
use unireg_derive::unireg_error;

#[unireg_error]
pub enum SeatError {
    #[error("Seat I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Course is full{}: {message}", format_context(.context))]
    Full { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_seat() -> Result<(), SeatError> {
    Err(std::io::Error::other("disk")).context("reading seat map")
}

fn main() {
    let err = read_seat().unwrap_err();
    assert_eq!(err.to_string(), "Seat I/O error (reading seat map): disk");

    let full: Result<(), SeatError> =
        Err(SeatError::Full { message: "CS101".into(), context: None });
    let full = full.context("enroll").unwrap_err();
    assert_eq!(full.to_string(), "Course is full (enroll): CS101");

    let internal: SeatError = "boom".into();
    assert!(matches!(internal, SeatError::Internal { .. }));
}
