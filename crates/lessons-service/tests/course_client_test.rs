//! Tests for the HTTP course-membership client against a mock server.

use lessons_core::collaborator::CourseMembership;
use lessons_core::error::MembershipError;
use lessons_service::config::CourseServiceConfig;
use lessons_service::course::HttpCourseMembership;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> HttpCourseMembership {
    HttpCourseMembership::new(&CourseServiceConfig {
        base_url: format!("{}/", server.uri()),
        timeout_ms: 1000,
    })
    .unwrap()
}

#[tokio::test]
async fn roster_is_fetched_with_forwarded_bearer() {
    let server = MockServer::start().await;
    let course_id = Uuid::new_v4();
    let (instructor, student) = (Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path(format!("/courses/{course_id}/members")))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [
                { "userId": instructor, "permissions": ["LESSONS_CREATE", "LESSONS_VIEW"] },
                { "userId": student, "permissions": ["LESSONS_VIEW"] },
                { "userId": Uuid::nil() },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let members = client_for(&server)
        .await
        .get_members(course_id, "Bearer abc")
        .await
        .unwrap();

    assert_eq!(members.len(), 3);
    assert!(members[&instructor].contains("LESSONS_CREATE"));
    assert_eq!(members[&student].len(), 1);
    assert!(members[&Uuid::nil()].is_empty());
}

#[tokio::test]
async fn status_codes_map_to_membership_errors() {
    let server = MockServer::start().await;
    let (denied, missing, broken) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    for (course_id, status) in [(denied, 403), (missing, 404), (broken, 502)] {
        Mock::given(method("GET"))
            .and(path(format!("/courses/{course_id}/members")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let client = client_for(&server).await;

    assert_eq!(
        client.get_members(denied, "Bearer x").await.unwrap_err(),
        MembershipError::Unauthorized
    );
    assert_eq!(
        client.get_members(missing, "Bearer x").await.unwrap_err(),
        MembershipError::CourseNotFound(missing)
    );
    assert!(matches!(
        client.get_members(broken, "Bearer x").await.unwrap_err(),
        MembershipError::Unavailable(_)
    ));
}

#[tokio::test]
async fn slow_course_service_times_out() {
    let server = MockServer::start().await;
    let course_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/courses/{course_id}/members")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "members": [] }))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = HttpCourseMembership::new(&CourseServiceConfig {
        base_url: server.uri(),
        timeout_ms: 50,
    })
    .unwrap();

    assert!(matches!(
        client.get_members(course_id, "Bearer x").await.unwrap_err(),
        MembershipError::Unavailable(_)
    ));
}
