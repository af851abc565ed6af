use serde_json::json;
use tempfile::TempDir;
use unireg_enrollment::{
    CourseId, Enrollment, EnrollmentError, EnrollmentEvent, LedgerOrigin, SnapshotStore, StudentId,
    StudentProfile,
};
use unireg_event_bus::{EventBus, EventReceiverExt};
use unireg_kernel::domain::config::ApiConfig;
use unireg_kernel::domain::constants::{LEDGER_SNAPSHOT_KEY, SEED_CATALOG_KEY};
use unireg_storage::Storage;

async fn storage(temp: &TempDir) -> Storage {
    Storage::builder().root(temp.path()).connect().await.unwrap()
}

async fn seed(storage: &Storage) {
    let catalog = json!([
        { "id": "CS101", "title": "Programming", "department": "CS",
          "timeSlot": "Mon 09:00", "capacity": 2, "credits": 6 },
        { "id": "MA201", "title": "Linear Algebra", "department": "Math",
          "timeSlot": "Tue 11:00", "capacity": 1, "credits": 5 },
    ]);
    storage.write(SEED_CATALOG_KEY, catalog.to_string().as_bytes()).await.unwrap();
}

fn profile(number: &str) -> StudentProfile {
    StudentProfile {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        student_number: number.to_owned(),
        email: format!("{number}@uni.example").to_lowercase(),
        department: "CS".to_owned(),
    }
}

#[tokio::test]
async fn init_creates_slice() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;

    let slice = unireg_enrollment::init(&ApiConfig::default(), &storage, &EventBus::new())
        .await
        .expect("init should succeed");

    assert_eq!(slice.id, std::any::TypeId::of::<Enrollment>());
    assert!(slice.downcast_ref::<Enrollment>().is_some());
}

#[tokio::test]
async fn invalid_bounds_fail_init() {
    let temp = TempDir::new().unwrap();
    let mut config = ApiConfig::default();
    config.registration.min_courses = 8;
    config.registration.max_courses = 7;

    let err = Enrollment::open(&config, &storage(&temp).await, &EventBus::new()).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::Validation { .. }), "{err}");
}

#[tokio::test]
async fn load_prefers_snapshot_over_seed() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let store = SnapshotStore::new(storage.clone());
    let limits = Default::default();

    let (empty, origin) = store.load(limits).await.unwrap();
    assert_eq!(origin, LedgerOrigin::Empty);
    assert!(empty.courses(None).is_empty());

    seed(&storage).await;
    let (seeded, origin) = store.load(limits).await.unwrap();
    assert_eq!(origin, LedgerOrigin::Seed);
    assert_eq!(seeded.courses(None).len(), 2);

    let student = seeded.register_student(profile("S1")).unwrap();
    seeded.enroll(&student.id, &"MA201".into()).unwrap();
    store.save(&seeded).await.unwrap();

    let (restored, origin) = SnapshotStore::new(storage).load(limits).await.unwrap();
    assert_eq!(origin, LedgerOrigin::Snapshot);
    assert_eq!(restored.snapshot(), seeded.snapshot());
    assert!(restored.course(&"MA201".into()).unwrap().is_full());
}

#[tokio::test]
async fn inconsistent_snapshot_is_rejected() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let broken = json!({
        "revision": 3,
        "courses": [{ "id": "CS101", "title": "Programming", "department": "CS",
                      "timeSlot": "Mon 09:00", "capacity": 2, "enrolled": 1, "credits": 6 }],
        "students": [],
    });
    storage.write(LEDGER_SNAPSHOT_KEY, broken.to_string().as_bytes()).await.unwrap();

    let err = SnapshotStore::new(storage).load(Default::default()).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::Validation { .. }), "{err}");
}

#[tokio::test]
async fn malformed_snapshot_is_a_serialization_error() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    storage.write(LEDGER_SNAPSHOT_KEY, b"{ not json").await.unwrap();

    let err = SnapshotStore::new(storage).load(Default::default()).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::Serialization { .. }), "{err}");
}

#[tokio::test]
async fn commits_are_persisted_and_published() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    seed(&storage).await;
    let events = EventBus::new();

    let enrollment = Enrollment::open(&ApiConfig::default(), &storage, &events).await.unwrap();
    let mut rx = enrollment.subscribe().unwrap();

    let student = enrollment.register_student(profile("S7")).await.unwrap();
    let course = CourseId::from("CS101");
    let offering = enrollment.enroll(&student.id, &course).await.unwrap();
    assert_eq!(offering.remaining(), 1);

    assert_eq!(
        *rx.next_event().await.unwrap(),
        EnrollmentEvent::StudentRegistered { student: student.id.clone() }
    );
    assert_eq!(
        *rx.next_event().await.unwrap(),
        EnrollmentEvent::Enrolled { student: student.id.clone(), course: course.clone(), remaining: 1 }
    );

    assert!(storage.exists(LEDGER_SNAPSHOT_KEY).await.unwrap());
    let reopened = Enrollment::open(&ApiConfig::default(), &storage, &EventBus::new()).await.unwrap();
    assert_eq!(reopened.ledger.snapshot(), enrollment.ledger.snapshot());

    enrollment.drop_course(&student.id, &course).await.unwrap();
    let dropped = rx.next_event().await.unwrap();
    assert_eq!(dropped.kind(), "dropped");
    assert_eq!(dropped.student(), &student.id);
}

#[tokio::test]
async fn rejected_operations_publish_nothing() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    seed(&storage).await;
    let events = EventBus::new();
    let enrollment = Enrollment::open(&ApiConfig::default(), &storage, &events).await.unwrap();

    let ghost = StudentId::from("ghost");
    let mut rx = enrollment.subscribe().unwrap();
    let err = enrollment.enroll(&ghost, &"CS101".into()).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound { .. }));

    assert!(rx.try_recv().is_err());
    assert!(!storage.exists(LEDGER_SNAPSHOT_KEY).await.unwrap());
}

#[tokio::test]
async fn persistence_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    seed(&storage).await;
    let mut config = ApiConfig::default();
    config.registration.persist = false;

    let enrollment = Enrollment::open(&config, &storage, &EventBus::new()).await.unwrap();
    let student = enrollment.register_student(profile("S9")).await.unwrap();
    enrollment.enroll(&student.id, &"CS101".into()).await.unwrap();
    enrollment.flush().await.unwrap();

    assert!(!storage.exists(LEDGER_SNAPSHOT_KEY).await.unwrap());
}

#[tokio::test]
async fn check_reports_conflicts_without_mutating() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let catalog = json!([
        { "id": "A", "title": "A", "department": "CS", "timeSlot": "Mon 09:00", "capacity": 5, "credits": 3 },
        { "id": "B", "title": "B", "department": "CS", "timeSlot": "Mon 09:00", "capacity": 5, "credits": 4 },
    ]);
    storage.write(SEED_CATALOG_KEY, catalog.to_string().as_bytes()).await.unwrap();
    let enrollment = Enrollment::open(&ApiConfig::default(), &storage, &EventBus::new()).await.unwrap();
    let before = enrollment.ledger.revision();

    let check = enrollment.check(&"B".into(), &[CourseId::from("A")]).unwrap();
    assert_eq!(check.admission.code(), "TIME_CONFLICT");
    assert_eq!(check.total_credits, 3);
    assert_eq!(check.selected, 1);
    assert!(!check.can_submit);
    assert_eq!(enrollment.ledger.revision(), before);

    let err = enrollment.check(&"nope".into(), &[]).unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound { .. }));
    let err = enrollment.check(&"B".into(), &[CourseId::from("A"), CourseId::from("missing")]).unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound { .. }), "{err}");
    let err = enrollment.check(&"B".into(), &[CourseId::from("A"), CourseId::from("A")]).unwrap_err();
    assert!(matches!(err, EnrollmentError::DuplicateEnrollment { .. }), "{err}");
    let err = enrollment.check(&"B".into(), &[CourseId::from("B")]).unwrap_err();
    assert!(matches!(err, EnrollmentError::DuplicateEnrollment { .. }), "{err}");
    assert_eq!(enrollment.ledger.revision(), before);
}

#[tokio::test]
async fn check_counts_the_same_selection_everywhere() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;
    let catalog: Vec<_> = (0..8)
        .map(|i| json!({ "id": format!("C{i}"), "title": format!("Course {i}"), "department": "CS",
                         "timeSlot": format!("Day {i}"), "capacity": 5, "credits": 2 }))
        .collect();
    storage.write(SEED_CATALOG_KEY, json!(catalog).to_string().as_bytes()).await.unwrap();
    let enrollment = Enrollment::open(&ApiConfig::default(), &storage, &EventBus::new()).await.unwrap();

    let seven: Vec<CourseId> = (0..7).map(|i| CourseId::from(format!("C{i}"))).collect();
    let check = enrollment.check(&"C7".into(), &seven).unwrap();
    assert_eq!(check.admission.code(), "ALREADY_MAX_COURSES");
    assert_eq!(check.selected, 7);
    assert_eq!(check.total_credits, 14);
    assert!(check.can_submit);

    let mut padded = seven[..6].to_vec();
    padded.push("GHOST".into());
    let err = enrollment.check(&"C7".into(), &padded).unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound { .. }), "{err}");
}
