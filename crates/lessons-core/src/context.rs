//! Per-request context handed to every service call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::principal::Principal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub resource_id: Option<Uuid>,
}

/// Query-string parameters shared by all find-style calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryParams {
    #[serde(rename = "$limit", default)]
    pub limit: Option<u64>,
    #[serde(rename = "$skip", default)]
    pub skip: Option<u64>,
    /// Load sub-resources along with a single lesson.
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub route: Route,
    pub principal: Principal,
    /// Raw bearer credential, forwarded to collaborating services.
    pub authorization: String,
    pub query: QueryParams,
}

impl RequestContext {
    pub fn new(principal: Principal, authorization: impl Into<String>) -> Self {
        Self {
            route: Route::default(),
            principal,
            authorization: authorization.into(),
            query: QueryParams::default(),
        }
    }

    pub fn with_course(mut self, course_id: Uuid) -> Self {
        self.route.course_id = Some(course_id);
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Derive the context for a call into the lesson's sub-resources.
    ///
    /// Caller and credential are kept; the route points at the lesson
    /// only, and the query is reset apart from pagination.
    pub fn for_lesson(&self, lesson_id: Uuid) -> Self {
        Self {
            route: Route {
                course_id: self.route.course_id,
                lesson_id: Some(lesson_id),
                resource_id: None,
            },
            principal: self.principal,
            authorization: self.authorization.clone(),
            query: QueryParams {
                limit: self.query.limit,
                skip: self.query.skip,
                all: false,
            },
        }
    }
}
