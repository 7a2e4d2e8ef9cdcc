/// Owner-scoped task operations
///
/// Every method takes the caller's id as `owner_id`. Input is validated before
/// storage is touched, and a task owned by someone else is reported as
/// `TaskError::NotFound`, exactly like a missing one.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use todo_shared::models::task::CreateTask;
/// use todo_shared::services::tasks::{PaginationConfig, TaskError, TaskService};
/// use todo_shared::store::memory::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), TaskError> {
/// let service = TaskService::new(Arc::new(MemoryStore::new()), PaginationConfig::default());
/// let owner = Uuid::new_v4();
///
/// let task = service
///     .create(owner, CreateTask { title: "Buy milk".to_string(), description: None })
///     .await?;
/// let toggled = service.toggle_completion(owner, task.id).await?;
/// assert!(toggled.is_completed);
///
/// let other = Uuid::new_v4();
/// assert!(matches!(service.get(other, task.id).await, Err(TaskError::NotFound)));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use uuid::Uuid;

use crate::models::task::{CreateTask, FieldError, NewTask, Task, TaskChanges, UpdateTask};
use crate::store::{StoreError, TaskStore};

/// Default page size when the caller gives no `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a caller can ask for; bigger limits are clamped
pub const MAX_PAGE_SIZE: i64 = 100;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Input failed validation; nothing was stored
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// No task with this id belongs to the caller
    #[error("Task not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TaskError {
    fn validation(field: &str, message: &str) -> Self {
        TaskError::Validation(vec![FieldError::new(field, message)])
    }
}

/// Pagination limits for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    /// Resolves optional `skip`/`limit` into a concrete `(offset, limit)`
    ///
    /// A missing limit uses the default, a limit above the maximum is clamped.
    /// Negative `skip` or a limit below 1 is a validation error.
    pub fn resolve(&self, skip: Option<i64>, limit: Option<i64>) -> Result<(i64, i64), TaskError> {
        let skip = skip.unwrap_or(0);
        if skip < 0 {
            return Err(TaskError::validation("skip", "skip must be zero or greater"));
        }

        let limit = limit.unwrap_or(self.default_limit);
        if limit < 1 {
            return Err(TaskError::validation("limit", "limit must be at least 1"));
        }

        Ok((skip, limit.min(self.max_limit)))
    }
}

/// Task operations over any [`TaskStore`]
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    pagination: PaginationConfig,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService")
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }

    /// Creates a task for `owner_id`
    ///
    /// The title is trimmed; `is_completed` starts false and both timestamps
    /// are equal.
    pub async fn create(&self, owner_id: Uuid, input: CreateTask) -> Result<Task, TaskError> {
        let new_task = NewTask::try_from(input).map_err(TaskError::Validation)?;
        let task = self.store.insert_task(owner_id, new_task).await?;

        tracing::info!(task_id = %task.id, %owner_id, "Task created");
        Ok(task)
    }

    /// Lists the owner's tasks, newest first
    pub async fn list(
        &self,
        owner_id: Uuid,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Task>, TaskError> {
        let (offset, limit) = self.pagination.resolve(skip, limit)?;
        Ok(self.store.list_tasks(owner_id, offset, limit).await?)
    }

    /// Total number of tasks the owner has
    pub async fn count(&self, owner_id: Uuid) -> Result<i64, TaskError> {
        Ok(self.store.count_tasks(owner_id).await?)
    }

    pub async fn get(&self, owner_id: Uuid, task_id: Uuid) -> Result<Task, TaskError> {
        self.store
            .find_task(owner_id, task_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Applies a partial update
    ///
    /// Only supplied fields change. `updated_at` advances even when nothing
    /// was supplied.
    pub async fn update(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        input: UpdateTask,
    ) -> Result<Task, TaskError> {
        let changes = TaskChanges::try_from(input).map_err(TaskError::Validation)?;

        let task = self
            .store
            .update_task(owner_id, task_id, changes)
            .await?
            .ok_or(TaskError::NotFound)?;

        tracing::info!(%task_id, %owner_id, "Task updated");
        Ok(task)
    }

    /// Deletes a task; `false` when the owner has no such task
    pub async fn delete(&self, owner_id: Uuid, task_id: Uuid) -> Result<bool, TaskError> {
        let deleted = self.store.delete_task(owner_id, task_id).await?;

        if deleted {
            tracing::info!(%task_id, %owner_id, "Task deleted");
        }
        Ok(deleted)
    }

    /// Flips `is_completed` atomically
    pub async fn toggle_completion(&self, owner_id: Uuid, task_id: Uuid) -> Result<Task, TaskError> {
        let task = self
            .store
            .toggle_task(owner_id, task_id)
            .await?
            .ok_or(TaskError::NotFound)?;

        tracing::info!(%task_id, %owner_id, is_completed = task.is_completed, "Task toggled");
        Ok(task)
    }
}
