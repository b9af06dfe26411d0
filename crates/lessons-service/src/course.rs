//! HTTP client for the course service's membership roster.

use std::collections::BTreeSet;
use std::time::Duration;

use lessons_core::collaborator::{CourseMembers, CourseMembership};
use lessons_core::error::MembershipError;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::CourseServiceConfig;

/// One roster entry as returned by `GET /courses/{id}/members`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberEntry {
    user_id: Uuid,
    #[serde(default)]
    permissions: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    members: Vec<MemberEntry>,
}

/// [`CourseMembership`] backed by the course service's REST API.
///
/// The caller's authorization header is forwarded unchanged.
#[derive(Clone)]
pub struct HttpCourseMembership {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpCourseMembership {
    pub fn new(config: &CourseServiceConfig) -> Result<Self, MembershipError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent("lessons-service/1.0")
            .build()
            .map_err(|e| MembershipError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

impl CourseMembership for HttpCourseMembership {
    async fn get_members(
        &self,
        course_id: Uuid,
        authorization: &str,
    ) -> Result<CourseMembers, MembershipError> {
        let url = format!("{}/courses/{course_id}/members", self.base_url);
        debug!(%course_id, url = %url, "Fetching course roster");

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| MembershipError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(MembershipError::Unauthorized);
            }
            StatusCode::NOT_FOUND => return Err(MembershipError::CourseNotFound(course_id)),
            status if !status.is_success() => {
                return Err(MembershipError::Unavailable(format!(
                    "course service returned {status}"
                )));
            }
            _ => {}
        }

        let body: MembersResponse = response
            .json()
            .await
            .map_err(|e| MembershipError::Unavailable(format!("invalid roster: {e}")))?;

        Ok(body
            .members
            .into_iter()
            .map(|m| (m.user_id, m.permissions))
            .collect())
    }
}
