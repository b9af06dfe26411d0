//! Lesson domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LessonsError, LessonsResult};
use crate::models::permission::{AccessControlEntry, Protected};

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_NOTE_LEN: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub note: String,
    pub visible: bool,
    pub position: i64,
    /// Ordered section references.
    pub sections: Vec<Uuid>,
    pub permissions: Vec<AccessControlEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Lesson {
    /// Build a not-yet-persisted lesson with a fresh id.
    pub fn new(course_id: Uuid, input: CreateLesson) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            title: input.title,
            note: input.note,
            visible: input.visible,
            position: input.position,
            sections: Vec::new(),
            permissions: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Apply an allow-listed patch field by field.
    pub fn apply(&mut self, patch: &LessonPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(note) = &patch.note {
            self.note.clone_from(note);
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        self.updated_at = Utc::now();
    }
}

impl Protected for Lesson {
    fn permissions(&self) -> &[AccessControlEntry] {
        &self.permissions
    }

    fn permissions_mut(&mut self) -> &mut Vec<AccessControlEntry> {
        &mut self.permissions
    }
}

/// Payload accepted when creating a lesson. The course id comes from
/// the route, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLesson {
    pub title: String,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub position: i64,
}

fn default_visible() -> bool {
    true
}

impl CreateLesson {
    pub fn validate(&self) -> LessonsResult<()> {
        validate_title(&self.title)?;
        validate_note(&self.note)
    }
}

/// The fields a caller may change on an existing lesson.
///
/// Anything else in the payload (the access-control list in
/// particular) is rejected during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LessonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl LessonPatch {
    /// Map an untyped payload onto the allow-list.
    pub fn from_value(value: serde_json::Value) -> LessonsResult<Self> {
        let patch: Self = serde_json::from_value(value)
            .map_err(|e| LessonsError::validation(format!("invalid lesson patch: {e}")))?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.note.is_none() && self.visible.is_none() && self.position.is_none()
    }

    pub fn validate(&self) -> LessonsResult<()> {
        if self.is_empty() {
            return Err(LessonsError::validation("lesson patch contains no fields"));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(note) = &self.note {
            validate_note(note)?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> LessonsResult<()> {
    if title.trim().is_empty() {
        return Err(LessonsError::validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(LessonsError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_note(note: &str) -> LessonsResult<()> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(LessonsError::validation(format!(
            "note must be at most {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_rejects_permissions_field() {
        let err = LessonPatch::from_value(json!({ "title": "New", "permissions": [] })).unwrap_err();
        assert!(matches!(err, LessonsError::Validation { .. }));
    }

    #[test]
    fn patch_rejects_empty_payload() {
        let err = LessonPatch::from_value(json!({})).unwrap_err();
        assert!(matches!(err, LessonsError::Validation { .. }));
    }

    #[test]
    fn patch_applies_only_given_fields() {
        let mut lesson = Lesson::new(
            Uuid::new_v4(),
            CreateLesson {
                title: "Old".into(),
                note: "keep me".into(),
                visible: true,
                position: 3,
            },
        );
        let patch = LessonPatch::from_value(json!({ "title": "New", "visible": false })).unwrap();
        lesson.apply(&patch);

        assert_eq!(lesson.title, "New");
        assert_eq!(lesson.note, "keep me");
        assert!(!lesson.visible);
        assert_eq!(lesson.position, 3);
    }

    #[test]
    fn create_requires_title() {
        let input: CreateLesson = serde_json::from_value(json!({ "title": "   " })).unwrap();
        assert!(input.validate().is_err());

        let input: CreateLesson = serde_json::from_value(json!({ "title": "Intro" })).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.visible);
        assert_eq!(input.note, "");
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let parsed = serde_json::from_value::<CreateLesson>(json!({
            "title": "Intro",
            "courseId": "abc",
        }));
        assert!(parsed.is_err());
    }
}
