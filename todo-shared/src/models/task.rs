/// Task model and input validation
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Inputs arrive as [`CreateTask`] / [`UpdateTask`] and are turned into the
/// validated [`NewTask`] / [`TaskChanges`] before any store sees them.
///
/// # Example
///
/// ```
/// use todo_shared::models::task::{CreateTask, NewTask};
///
/// let new_task = NewTask::try_from(CreateTask {
///     title: "  Buy milk  ".to_string(),
///     description: None,
/// })
/// .unwrap();
/// assert_eq!(new_task.title, "Buy milk");
///
/// let blank = NewTask::try_from(CreateTask { title: "   ".to_string(), description: None });
/// assert!(blank.is_err());
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Maximum title length in characters (after trimming)
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Task owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Trimmed, non-empty title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Completion flag
    pub is_completed: bool,

    /// Owning user; fixed at creation
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation, including toggles
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a task
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for a partial update
///
/// Absent fields keep their current value. For `description`, an explicit
/// `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Validation failure on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validated task ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

/// Validated partial update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_completed: Option<bool>,
}

impl TryFrom<CreateTask> for NewTask {
    type Error = Vec<FieldError>;

    fn try_from(input: CreateTask) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let title = validate_title(&input.title).map_err(|e| errors.push(e)).ok();
        if let Some(description) = input.description.as_deref() {
            if let Err(e) = validate_description(description) {
                errors.push(e);
            }
        }

        match title {
            Some(title) if errors.is_empty() => Ok(Self {
                title,
                description: input.description,
            }),
            _ => Err(errors),
        }
    }
}

impl TryFrom<UpdateTask> for TaskChanges {
    type Error = Vec<FieldError>;

    fn try_from(input: UpdateTask) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let title = match input.title.as_deref() {
            Some(raw) => validate_title(raw).map_err(|e| errors.push(e)).ok(),
            None => None,
        };
        if let Some(Some(description)) = &input.description {
            if let Err(e) = validate_description(description) {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            title,
            description: input.description,
            is_completed: input.is_completed,
        })
    }
}

impl TaskChanges {
    /// Applies the changes to a task in place (without touching timestamps)
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
    }
}

/// Trims and checks a title
///
/// Length is measured in characters after trimming.
pub fn validate_title(raw: &str) -> Result<String, FieldError> {
    let title = raw.trim();

    if title.is_empty() {
        return Err(FieldError::new("title", "Title cannot be empty"));
    }

    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(FieldError::new(
            "title",
            format!("Title must be at most {} characters ({} provided)", MAX_TITLE_LEN, len),
        ));
    }

    Ok(title.to_string())
}

/// Checks a description's length
pub fn validate_description(description: &str) -> Result<(), FieldError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(FieldError::new(
            "description",
            format!(
                "Description must be at most {} characters ({} provided)",
                MAX_DESCRIPTION_LEN, len
            ),
        ));
    }

    Ok(())
}

/// Distinguishes an explicit `null` from an absent field
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
