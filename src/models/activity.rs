use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub visible: bool,
    #[sqlx(skip)]
    pub activities: Vec<Activity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum ActivityType {
    Assignment,
    Quiz,
    Forum,
    Resource,
    Page,
    Video,
    Url,
    GenerativeTask,
}

/// Activity metadata: the keys the client renders are typed, anything else is
/// carried through `extra` untouched. A known key that is `null` or holds a
/// different JSON type also stays in `extra`, so any object round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct ActivityMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creativity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Removes `key` from `map` only if it holds a non-null value of type `T`.
fn take_typed<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    let typed = T::deserialize(value).ok()?;
    map.remove(key);
    Some(typed)
}

impl From<Map<String, Value>> for ActivityMetadata {
    fn from(mut extra: Map<String, Value>) -> Self {
        ActivityMetadata {
            file_url: take_typed(&mut extra, "fileUrl"),
            file_size: take_typed(&mut extra, "fileSize"),
            file_type: take_typed(&mut extra, "fileType"),
            video_url: take_typed(&mut extra, "videoUrl"),
            video_duration: take_typed(&mut extra, "videoDuration"),
            url: take_typed(&mut extra, "url"),
            attempts: take_typed(&mut extra, "attempts"),
            time_limit: take_typed(&mut extra, "timeLimit"),
            questions: take_typed(&mut extra, "questions"),
            points: take_typed(&mut extra, "points"),
            ai_model: take_typed(&mut extra, "aiModel"),
            creativity_level: take_typed(&mut extra, "creativityLevel"),
            difficulty: take_typed(&mut extra, "difficulty"),
            task_type: take_typed(&mut extra, "taskType"),
            extra,
        }
    }
}

impl ActivityMetadata {
    /// Key-by-key merge: keys present in `patch` overwrite, the rest are kept.
    /// Each key ends up either typed or in `extra`, never both.
    pub fn merge(&mut self, patch: ActivityMetadata) {
        macro_rules! take {
            ($($field:ident => $key:literal),*) => {
                $(
                    if patch.$field.is_some() {
                        self.$field = patch.$field;
                        self.extra.remove($key);
                    } else if patch.extra.contains_key($key) {
                        self.$field = None;
                    }
                )*
            };
        }
        take!(
            file_url => "fileUrl",
            file_size => "fileSize",
            file_type => "fileType",
            video_url => "videoUrl",
            video_duration => "videoDuration",
            url => "url",
            attempts => "attempts",
            time_limit => "timeLimit",
            questions => "questions",
            points => "points",
            ai_model => "aiModel",
            creativity_level => "creativityLevel",
            difficulty => "difficulty",
            task_type => "taskType"
        );
        self.extra.extend(patch.extra);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub section_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub visible: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<String>,
    #[sqlx(json)]
    pub metadata: ActivityMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSectionRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: i64,
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub order: i64,
    #[serde(default)]
    pub visible: bool,
    pub due_date: Option<String>,
    pub available_from: Option<String>,
    pub available_until: Option<String>,
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
    pub order: Option<i64>,
    pub visible: Option<bool>,
    pub completed: Option<bool>,
    pub due_date: Option<String>,
    pub available_from: Option<String>,
    pub available_until: Option<String>,
    pub metadata: Option<ActivityMetadata>,
}
