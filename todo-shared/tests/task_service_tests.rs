/// Integration tests for owner-scoped task operations
///
/// Runs `TaskService` over the in-memory store, so no database is needed.

use std::sync::Arc;

use todo_shared::models::task::{CreateTask, UpdateTask};
use todo_shared::services::tasks::{PaginationConfig, TaskError, TaskService};
use todo_shared::store::memory::MemoryStore;
use uuid::Uuid;

fn service() -> TaskService {
    TaskService::new(Arc::new(MemoryStore::new()), PaginationConfig::default())
}

fn create(title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn test_create_then_get_matches() {
    let service = service();
    let owner = Uuid::new_v4();

    let created = service
        .create(
            owner,
            CreateTask {
                title: "  Buy milk ".to_string(),
                description: Some("2 litres".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.description.as_deref(), Some("2 litres"));
    assert!(!created.is_completed);
    assert_eq!(created.owner_id, owner);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = service.get(owner, created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_toggle_is_involution_and_advances_updated_at() {
    let service = service();
    let owner = Uuid::new_v4();
    let task = service.create(owner, create("Walk dog")).await.unwrap();

    let once = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(once.is_completed);
    assert!(once.updated_at > task.updated_at);

    let twice = service.toggle_completion(owner, task.id).await.unwrap();
    assert!(!twice.is_completed);
    assert!(twice.updated_at > once.updated_at);
    assert_eq!(twice.created_at, task.created_at);
}

#[tokio::test]
async fn test_foreign_owner_sees_not_found() {
    let service = service();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let task = service.create(alice, create("Alice's task")).await.unwrap();

    assert!(matches!(service.get(bob, task.id).await, Err(TaskError::NotFound)));
    assert!(matches!(
        service.update(bob, task.id, UpdateTask::default()).await,
        Err(TaskError::NotFound)
    ));
    assert!(matches!(
        service.toggle_completion(bob, task.id).await,
        Err(TaskError::NotFound)
    ));
    assert!(!service.delete(bob, task.id).await.unwrap());

    // Alice's task is untouched
    assert_eq!(service.get(alice, task.id).await.unwrap(), task);
    assert!(service.list(bob, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_only_changes_supplied_fields() {
    let service = service();
    let owner = Uuid::new_v4();
    let task = service
        .create(
            owner,
            CreateTask {
                title: "Original".to_string(),
                description: Some("details".to_string()),
            },
        )
        .await
        .unwrap();

    let renamed = service
        .update(
            owner,
            task.id,
            UpdateTask {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Renamed");
    assert_eq!(renamed.description.as_deref(), Some("details"));
    assert!(renamed.updated_at > task.updated_at);

    let cleared = service
        .update(
            owner,
            task.id,
            UpdateTask {
                description: Some(None),
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.title, "Renamed");
    assert_eq!(cleared.description, None);
    assert!(cleared.is_completed);
}

#[tokio::test]
async fn test_empty_update_still_refreshes_updated_at() {
    let service = service();
    let owner = Uuid::new_v4();
    let task = service.create(owner, create("Untouched")).await.unwrap();

    let updated = service
        .update(owner, task.id, UpdateTask::default())
        .await
        .unwrap();
    assert_eq!(updated.title, task.title);
    assert!(updated.updated_at > task.updated_at);
}

#[tokio::test]
async fn test_title_validation() {
    let service = service();
    let owner = Uuid::new_v4();

    assert!(matches!(
        service.create(owner, create(" ")).await,
        Err(TaskError::Validation(_))
    ));
    assert!(matches!(
        service.create(owner, create(&"a".repeat(256))).await,
        Err(TaskError::Validation(_))
    ));

    let ok = service.create(owner, create(&"a".repeat(255))).await.unwrap();
    assert_eq!(ok.title.chars().count(), 255);

    assert!(matches!(
        service
            .update(
                owner,
                ok.id,
                UpdateTask {
                    title: Some("   ".to_string()),
                    ..Default::default()
                }
            )
            .await,
        Err(TaskError::Validation(_))
    ));

    // Rejected input leaves nothing behind
    assert_eq!(service.count(owner).await.unwrap(), 1);
    assert_eq!(service.get(owner, ok.id).await.unwrap(), ok);
}

#[tokio::test]
async fn test_validation_runs_before_lookup() {
    let service = service();
    let result = service
        .update(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UpdateTask {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(TaskError::Validation(_))));
}

#[tokio::test]
async fn test_list_newest_first_and_paginates_without_gaps() {
    let service = service();
    let owner = Uuid::new_v4();

    let mut created = Vec::new();
    for i in 0..7 {
        created.push(service.create(owner, create(&format!("task {}", i))).await.unwrap());
    }
    // Another owner's tasks never show up
    service.create(Uuid::new_v4(), create("foreign")).await.unwrap();

    let all = service.list(owner, None, None).await.unwrap();
    assert_eq!(all.len(), 7);
    for pair in all.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
    assert_eq!(all[0].id, created[6].id);
    assert_eq!(all[6].id, created[0].id);

    let first = service.list(owner, Some(0), Some(3)).await.unwrap();
    let second = service.list(owner, Some(3), Some(3)).await.unwrap();
    let third = service.list(owner, Some(6), Some(3)).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert_eq!(third.len(), 1);

    let paged: Vec<Uuid> = first
        .iter()
        .chain(second.iter())
        .chain(third.iter())
        .map(|t| t.id)
        .collect();
    let expected: Vec<Uuid> = all.iter().map(|t| t.id).collect();
    assert_eq!(paged, expected);

    assert!(service.list(owner, Some(50), None).await.unwrap().is_empty());
    assert_eq!(service.count(owner).await.unwrap(), 7);
}

#[tokio::test]
async fn test_list_limit_is_clamped() {
    let service = TaskService::new(
        Arc::new(MemoryStore::new()),
        PaginationConfig {
            default_limit: 2,
            max_limit: 3,
        },
    );
    let owner = Uuid::new_v4();
    for i in 0..5 {
        service.create(owner, create(&format!("t{}", i))).await.unwrap();
    }

    assert_eq!(service.list(owner, None, None).await.unwrap().len(), 2);
    assert_eq!(service.list(owner, None, Some(1000)).await.unwrap().len(), 3);
    assert!(matches!(
        service.list(owner, None, Some(0)).await,
        Err(TaskError::Validation(_))
    ));
    assert!(matches!(
        service.list(owner, Some(-1), None).await,
        Err(TaskError::Validation(_))
    ));
}

#[tokio::test]
async fn test_delete_twice() {
    let service = service();
    let owner = Uuid::new_v4();
    let task = service.create(owner, create("Temporary")).await.unwrap();

    assert!(service.delete(owner, task.id).await.unwrap());
    assert!(!service.delete(owner, task.id).await.unwrap());
    assert!(matches!(service.get(owner, task.id).await, Err(TaskError::NotFound)));
}

#[tokio::test]
async fn test_concurrent_toggles_are_serialized() {
    let service = service();
    let owner = Uuid::new_v4();
    let task = service.create(owner, create("Contended")).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.toggle_completion(owner, task.id).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // An even number of flips lands back where it started
    let final_state = service.get(owner, task.id).await.unwrap();
    assert!(!final_state.is_completed);
}
