/// Storage layer
///
/// Services talk to storage only through the [`UserStore`] and [`TaskStore`]
/// traits. Two backends implement them:
///
/// - [`postgres::PgStore`]: sqlx over a PostgreSQL pool (production)
/// - [`memory::MemoryStore`]: in-process maps (development and tests)
///
/// Every task operation takes the owner id and filters on it, so a task that
/// belongs to someone else looks exactly like a task that does not exist.
///
/// # Example
///
/// ```
/// use todo_shared::models::task::NewTask;
/// use todo_shared::store::{memory::MemoryStore, TaskStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
///
/// let task = store
///     .insert_task(owner, NewTask { title: "Buy milk".to_string(), description: None })
///     .await?;
///
/// assert!(store.find_task(owner, task.id).await?.is_some());
/// assert!(store.find_task(Uuid::new_v4(), task.id).await?.is_none());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, User};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate email)
    #[error("Record already exists")]
    Conflict,

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps unique-constraint violations to `Conflict`, everything else to `Database`
    pub fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Database(err),
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user
    ///
    /// Returns `StoreError::Conflict` when the email is already taken.
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Looks a user up by exact email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Looks a user up by id
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
}

/// Owner-scoped task persistence
///
/// `None` / `false` results mean "no task with this id owned by this owner".
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task with `is_completed = false` and `created_at == updated_at`
    async fn insert_task(&self, owner_id: Uuid, task: NewTask) -> StoreResult<Task>;

    /// Lists an owner's tasks, newest first
    async fn list_tasks(&self, owner_id: Uuid, offset: i64, limit: i64) -> StoreResult<Vec<Task>>;

    /// Counts an owner's tasks
    async fn count_tasks(&self, owner_id: Uuid) -> StoreResult<i64>;

    async fn find_task(&self, owner_id: Uuid, task_id: Uuid) -> StoreResult<Option<Task>>;

    /// Applies a partial update and advances `updated_at`
    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>>;

    /// Deletes a task, returning whether anything was removed
    async fn delete_task(&self, owner_id: Uuid, task_id: Uuid) -> StoreResult<bool>;

    /// Flips `is_completed` and advances `updated_at` in one step
    async fn toggle_task(&self, owner_id: Uuid, task_id: Uuid) -> StoreResult<Option<Task>>;
}

/// Backend identity and liveness, reported by the health endpoint
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Short backend name (`"postgres"` or `"memory"`)
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
