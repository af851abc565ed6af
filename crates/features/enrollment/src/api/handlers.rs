use super::dto::{
    CheckRequest, CheckResponse, CourseQuery, CourseView, HeldCourse, RegisterStudentRequest,
    RosterEntryView, StudentDetail, StudentSummary, SubmitRequest, SubmitResponse,
};
use crate::Enrollment;
use crate::error::EnrollmentError;
use crate::model::{CourseId, StudentId};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use unireg_derive::api_handler;
use unireg_kernel::domain::constants::{TAG_COURSES, TAG_REGISTRATION, TAG_STUDENTS};
use unireg_kernel::ident::IdentGuard;
use unireg_kernel::server::{ApiErrorBody, ApiState};

fn course_id(raw: &str) -> Result<CourseId, EnrollmentError> {
    Ok(IdentGuard::verify(raw, "course")?.into())
}

fn student_id(raw: &str) -> Result<StudentId, EnrollmentError> {
    Ok(IdentGuard::verify(raw, "student")?.into())
}

#[api_handler(
    get,
    path = "/courses",
    params(("department" = Option<String>, Query, description = "Case-insensitive department filter")),
    responses((status = OK, description = "Catalog with live seat counts", body = [CourseView])),
    tag = TAG_COURSES,
)]
pub(super) async fn list_courses(
    State(state): State<ApiState>,
    Query(query): Query<CourseQuery>,
) -> Result<Json<Vec<CourseView>>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let courses = enrollment.ledger.courses(query.department.as_deref());
    Ok(Json(courses.into_iter().map(CourseView::from).collect()))
}

#[api_handler(
    get,
    path = "/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course code")),
    responses(
        (status = OK, body = CourseView),
        (status = NOT_FOUND, body = ApiErrorBody),
    ),
    tag = TAG_COURSES,
)]
pub(super) async fn get_course(
    State(state): State<ApiState>,
    Path(course): Path<String>,
) -> Result<Json<CourseView>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    Ok(Json(enrollment.ledger.course(&course_id(&course)?)?.into()))
}

#[api_handler(
    get,
    path = "/courses/{courseId}/students",
    params(("courseId" = String, Path, description = "Course code")),
    responses(
        (status = OK, description = "Students holding the course", body = [RosterEntryView]),
        (status = NOT_FOUND, body = ApiErrorBody),
    ),
    tag = TAG_COURSES,
)]
pub(super) async fn course_roster(
    State(state): State<ApiState>,
    Path(course): Path<String>,
) -> Result<Json<Vec<RosterEntryView>>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let roster = enrollment.ledger.roster(&course_id(&course)?)?;
    Ok(Json(roster.into_iter().map(RosterEntryView::from).collect()))
}

#[api_handler(
    get,
    path = "/students",
    responses((status = OK, body = [StudentSummary])),
    tag = TAG_STUDENTS,
)]
pub(super) async fn list_students(
    State(state): State<ApiState>,
) -> Result<Json<Vec<StudentSummary>>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    Ok(Json(enrollment.ledger.students().into_iter().map(StudentSummary::from).collect()))
}

#[api_handler(
    post,
    path = "/students",
    request_body = RegisterStudentRequest,
    responses(
        (status = CREATED, body = StudentSummary),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid profile or taken student number", body = ApiErrorBody),
    ),
    tag = TAG_STUDENTS,
)]
pub(super) async fn register_student(
    State(state): State<ApiState>,
    Json(request): Json<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<StudentSummary>), EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let student = enrollment.register_student(request.into()).await?;
    Ok((StatusCode::CREATED, Json(student.into())))
}

#[api_handler(
    get,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = OK, description = "Student with held courses and total credits", body = StudentDetail),
        (status = NOT_FOUND, body = ApiErrorBody),
    ),
    tag = TAG_STUDENTS,
)]
pub(super) async fn get_student(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<StudentDetail>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let (student, held) = enrollment.ledger.student_with_courses(&student_id(&id)?)?;

    let total_credits = enrollment.planner.total_credits(student.course_ids(), &held);
    let courses = held
        .into_iter()
        .filter_map(|course| {
            let enrolled_on = *student.courses.get(&course.id)?;
            Some(HeldCourse { course: course.into(), enrolled_on })
        })
        .collect();

    Ok(Json(StudentDetail { student: student.into(), courses, total_credits }))
}

#[api_handler(
    post,
    path = "/students/{id}/courses",
    params(("id" = String, Path, description = "Student id")),
    request_body = SubmitRequest,
    responses(
        (status = OK, description = "Selection replaced", body = SubmitResponse),
        (status = NOT_FOUND, body = ApiErrorBody),
        (status = CONFLICT, description = "Full course or duplicate id", body = ApiErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Selection size outside the limits", body = ApiErrorBody),
    ),
    tag = TAG_STUDENTS,
)]
pub(super) async fn submit_selection(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let student = student_id(&id)?;
    let courses = request.course_ids.iter().map(String::as_str).map(course_id).collect::<Result<Vec<_>, _>>()?;

    let outcome = enrollment.submit(&student, &courses).await?;
    let total = enrollment.planner.total_credits(&outcome.courses, &enrollment.ledger.courses(None));
    Ok(Json(SubmitResponse::new(outcome, total)))
}

#[api_handler(
    post,
    path = "/students/{id}/courses/{courseId}",
    params(
        ("id" = String, Path, description = "Student id"),
        ("courseId" = String, Path, description = "Course code"),
    ),
    responses(
        (status = OK, description = "Seat taken; course after the change", body = CourseView),
        (status = NOT_FOUND, body = ApiErrorBody),
        (status = CONFLICT, description = "Full course or already enrolled", body = ApiErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Student already holds the maximum", body = ApiErrorBody),
    ),
    tag = TAG_STUDENTS,
)]
pub(super) async fn enroll_course(
    State(state): State<ApiState>,
    Path((id, course)): Path<(String, String)>,
) -> Result<Json<CourseView>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let offering = enrollment.enroll(&student_id(&id)?, &course_id(&course)?).await?;
    Ok(Json(offering.into()))
}

#[api_handler(
    delete,
    path = "/students/{id}/courses/{courseId}",
    params(
        ("id" = String, Path, description = "Student id"),
        ("courseId" = String, Path, description = "Course code"),
    ),
    responses(
        (status = NO_CONTENT, description = "Seat released"),
        (status = NOT_FOUND, body = ApiErrorBody),
        (status = CONFLICT, description = "Course not held", body = ApiErrorBody),
    ),
    tag = TAG_STUDENTS,
)]
pub(super) async fn drop_course(
    State(state): State<ApiState>,
    Path((id, course)): Path<(String, String)>,
) -> Result<StatusCode, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    enrollment.drop_course(&student_id(&id)?, &course_id(&course)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    post,
    path = "/registration/check",
    request_body = CheckRequest,
    responses(
        (status = OK, description = "Advisory decision; nothing is reserved", body = CheckResponse),
        (status = NOT_FOUND, description = "Unknown course or selection id", body = ApiErrorBody),
        (status = CONFLICT, description = "Selection repeats an id or the candidate", body = ApiErrorBody),
    ),
    tag = TAG_REGISTRATION,
)]
pub(super) async fn check_registration(
    State(state): State<ApiState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, EnrollmentError> {
    let enrollment = state.try_get_slice::<Enrollment>()?;
    let selection: Vec<CourseId> = request.selection.into_iter().map(CourseId::from).collect();
    let check = enrollment.check(&course_id(&request.course_id)?, &selection)?;
    Ok(Json(check.into()))
}
