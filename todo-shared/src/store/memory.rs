/// In-memory storage backend
///
/// Keeps users and tasks in `tokio::sync::RwLock`-guarded maps. Every mutation
/// runs inside a single write-lock critical section, which gives the same
/// atomicity the PostgreSQL backend gets from single-statement updates.
///
/// Tasks carry an insertion sequence number so that listing stays
/// deterministic when two tasks share a `created_at`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreHealth, StoreResult, TaskStore, UserStore};
use crate::auth::authorization::authorize_owner;
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, User};

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    id_by_email: HashMap<String, Uuid>,
}

#[derive(Debug)]
struct StoredTask {
    seq: u64,
    task: Task,
}

#[derive(Debug, Default)]
struct Tasks {
    by_id: HashMap<Uuid, StoredTask>,
    next_seq: u64,
}

impl Tasks {
    /// Mutable access to a task, but only for its owner
    fn owned_mut(&mut self, owner_id: Uuid, task_id: Uuid) -> Option<&mut Task> {
        self.by_id
            .get_mut(&task_id)
            .map(|stored| &mut stored.task)
            .filter(|task| authorize_owner(owner_id, task.owner_id).is_ok())
    }
}

/// Process-local store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
    tasks: RwLock<Tasks>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Returns a timestamp strictly after `previous`
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let floor = previous + Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.id_by_email.contains_key(&data.email) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };

        users.id_by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());

        tracing::debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .id_by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, owner_id: Uuid, new_task: NewTask) -> StoreResult<Task> {
        let mut tasks = self.tasks.write().await;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new_task.title,
            description: new_task.description,
            is_completed: false,
            owner_id,
            created_at: now,
            updated_at: now,
        };

        let seq = tasks.next_seq;
        tasks.next_seq += 1;
        tasks.by_id.insert(
            task.id,
            StoredTask {
                seq,
                task: task.clone(),
            },
        );

        tracing::debug!(task_id = %task.id, %owner_id, "Inserted task");
        Ok(task)
    }

    async fn list_tasks(&self, owner_id: Uuid, offset: i64, limit: i64) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;

        let mut owned: Vec<&StoredTask> = tasks
            .by_id
            .values()
            .filter(|stored| stored.task.owner_id == owner_id)
            .collect();

        owned.sort_by(|a, b| {
            b.task
                .created_at
                .cmp(&a.task.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        Ok(owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|stored| stored.task.clone())
            .collect())
    }

    async fn count_tasks(&self, owner_id: Uuid) -> StoreResult<i64> {
        let tasks = self.tasks.read().await;
        let count = tasks
            .by_id
            .values()
            .filter(|stored| stored.task.owner_id == owner_id)
            .count();
        Ok(count as i64)
    }

    async fn find_task(&self, owner_id: Uuid, task_id: Uuid) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .by_id
            .get(&task_id)
            .filter(|stored| stored.task.owner_id == owner_id)
            .map(|stored| stored.task.clone()))
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;

        let Some(task) = tasks.owned_mut(owner_id, task_id) else {
            return Ok(None);
        };

        changes.apply_to(task);
        task.updated_at = advance(task.updated_at);

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, owner_id: Uuid, task_id: Uuid) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;

        if tasks.owned_mut(owner_id, task_id).is_none() {
            return Ok(false);
        }

        Ok(tasks.by_id.remove(&task_id).is_some())
    }

    async fn toggle_task(&self, owner_id: Uuid, task_id: Uuid) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;

        let Some(task) = tasks.owned_mut(owner_id, task_id) else {
            return Ok(None);
        };

        task.is_completed = !task.is_completed;
        task.updated_at = advance(task.updated_at);

        Ok(Some(task.clone()))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_advance_is_strictly_increasing() {
        let future = Utc::now() + Duration::hours(1);
        assert!(advance(future) > future);
        assert!(advance(Utc::now() - Duration::hours(1)) <= Utc::now());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let data = CreateUser {
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
        };

        store.insert_user(data.clone()).await.unwrap();
        let err = store.insert_user(data).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let store = MemoryStore::new();
        store
            .insert_user(CreateUser {
                email: "Bob@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        assert!(store.find_user_by_email("Bob@example.com").await.unwrap().is_some());
        assert!(store.find_user_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_insertion_on_equal_timestamps() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let first = store.insert_task(owner, new_task("first")).await.unwrap();
        let second = store.insert_task(owner, new_task("second")).await.unwrap();

        // Force a tie on created_at
        {
            let mut tasks = store.tasks.write().await;
            let ts = tasks.by_id[&first.id].task.created_at;
            if let Some(stored) = tasks.by_id.get_mut(&second.id) {
                stored.task.created_at = ts;
            }
        }

        let listed = store.list_tasks(owner, 0, 10).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_foreign_owner_cannot_mutate() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let task = store.insert_task(owner, new_task("mine")).await.unwrap();

        assert!(store.toggle_task(intruder, task.id).await.unwrap().is_none());
        assert!(!store.delete_task(intruder, task.id).await.unwrap());
        assert!(store
            .update_task(intruder, task.id, TaskChanges::default())
            .await
            .unwrap()
            .is_none());

        let unchanged = store.find_task(owner, task.id).await.unwrap().unwrap();
        assert_eq!(unchanged, task);
    }

    #[tokio::test]
    async fn test_health() {
        let store = MemoryStore::new();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.is_ok());
    }
}
