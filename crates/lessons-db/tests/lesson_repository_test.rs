//! Integration tests for the Lesson repository using in-memory SurrealDB.

use chrono::Utc;
use lessons_core::error::LessonsError;
use lessons_core::models::lesson::{CreateLesson, Lesson};
use lessons_core::models::permission::{AccessControlEntry, PermissionLevel};
use lessons_core::repository::LessonRepository;
use lessons_db::repository::SurrealLessonRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealLessonRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lessons_db::run_migrations(&db).await.unwrap();
    SurrealLessonRepository::new(db)
}

fn lesson(course_id: Uuid, title: &str, position: i64) -> Lesson {
    let mut lesson = Lesson::new(
        course_id,
        CreateLesson {
            title: title.into(),
            note: "some note".into(),
            visible: true,
            position,
        },
    );
    lesson.permissions = vec![
        AccessControlEntry::new(PermissionLevel::Write, Uuid::new_v4()),
        AccessControlEntry::new(PermissionLevel::Read, Uuid::new_v4()),
    ];
    lesson.sections = vec![Uuid::new_v4()];
    lesson
}

#[tokio::test]
async fn create_and_get_lesson() {
    let repo = setup().await;
    let course_id = Uuid::new_v4();
    let original = lesson(course_id, "Introduction", 0);

    repo.create(&original).await.unwrap();
    let fetched = repo.get_by_id(course_id, original.id).await.unwrap();

    assert_eq!(fetched.id, original.id);
    assert_eq!(fetched.course_id, course_id);
    assert_eq!(fetched.title, "Introduction");
    assert_eq!(fetched.note, "some note");
    assert_eq!(fetched.sections, original.sections);
    assert_eq!(fetched.permissions.len(), 2);
    assert_eq!(fetched.permissions[0].level, PermissionLevel::Write);
    assert_eq!(
        fetched.permissions[0].group.id(),
        original.permissions[0].group.id()
    );
    assert!(fetched.deleted_at.is_none());
}

#[tokio::test]
async fn get_is_scoped_to_course() {
    let repo = setup().await;
    let course_id = Uuid::new_v4();
    let original = lesson(course_id, "Scoped", 0);
    repo.create(&original).await.unwrap();

    let err = repo.get_by_id(Uuid::new_v4(), original.id).await.unwrap_err();
    assert!(matches!(err, LessonsError::NotFound { .. }));
}

#[tokio::test]
async fn soft_deleted_lessons_are_hidden() {
    let repo = setup().await;
    let course_id = Uuid::new_v4();
    let mut doomed = lesson(course_id, "Doomed", 0);
    let kept = lesson(course_id, "Kept", 1);
    repo.create(&doomed).await.unwrap();
    repo.create(&kept).await.unwrap();

    doomed.deleted_at = Some(Utc::now());
    repo.save(&doomed).await.unwrap();

    let err = repo.get_by_id(course_id, doomed.id).await.unwrap_err();
    assert!(matches!(err, LessonsError::NotFound { .. }));

    let listed = repo.find_by_course(course_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept.id);
}

#[tokio::test]
async fn find_orders_by_position() {
    let repo = setup().await;
    let course_id = Uuid::new_v4();
    let second = lesson(course_id, "Second", 2);
    let first = lesson(course_id, "First", 1);
    repo.create(&second).await.unwrap();
    repo.create(&first).await.unwrap();
    repo.create(&lesson(Uuid::new_v4(), "Elsewhere", 0))
        .await
        .unwrap();

    let titles: Vec<String> = repo
        .find_by_course(course_id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn save_overwrites_fields() {
    let repo = setup().await;
    let course_id = Uuid::new_v4();
    let mut stored = lesson(course_id, "Before", 0);
    repo.create(&stored).await.unwrap();

    stored.title = "After".into();
    stored.visible = false;
    repo.save(&stored).await.unwrap();

    let fetched = repo.get_by_id(course_id, stored.id).await.unwrap();
    assert_eq!(fetched.title, "After");
    assert!(!fetched.visible);
}

#[tokio::test]
async fn save_unknown_lesson_is_not_found() {
    let repo = setup().await;
    let ghost = lesson(Uuid::new_v4(), "Ghost", 0);

    let err = repo.save(&ghost).await.unwrap_err();
    assert!(matches!(err, LessonsError::NotFound { .. }));
}
