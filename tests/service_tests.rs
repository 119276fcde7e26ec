//! Integration tests for the task service and store.
//!
//! These tests verify listing, validation and completion rules using an
//! in-memory SQLite database, plus one file-backed pool.

use taskboard::db::Database;
use taskboard::error::TaskError;
use taskboard::service::TaskService;
use taskboard::types::{NewTask, RECENT_TASK_LIMIT};

/// Helper to create a service over a fresh in-memory database.
fn setup() -> TaskService {
    TaskService::new(Database::open_in_memory().expect("Failed to create in-memory database"))
}

fn titles(service: &TaskService) -> Vec<String> {
    service
        .list_recent_pending()
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect()
}

mod listing {
    use super::*;

    #[test]
    fn eight_tasks_list_the_five_newest() {
        let service = setup();
        for i in 1..=8 {
            service
                .create_task(&NewTask::new(format!("T{i}"), "X"))
                .unwrap();
        }
        assert_eq!(titles(&service), vec!["T8", "T7", "T6", "T5", "T4"]);
    }

    #[test]
    fn never_more_than_the_cap() {
        let service = setup();
        for i in 0..20 {
            service.db().insert_task_at(&format!("T{i}"), "X", i).unwrap();
        }
        assert_eq!(service.list_recent_pending().unwrap().len(), RECENT_TASK_LIMIT);
    }

    #[test]
    fn explicit_timestamps_decide_order_over_insertion() {
        let service = setup();
        service.db().insert_task_at("New", "D", 20_000).unwrap();
        service.db().insert_task_at("Old", "D", 10_000).unwrap();
        assert_eq!(titles(&service), vec!["New", "Old"]);
    }

    #[test]
    fn only_pending_tasks_are_listed() {
        let service = setup();
        service.create_task(&NewTask::new("Pending", "D")).unwrap();
        let done = service.create_task(&NewTask::new("Done", "D")).unwrap();
        service.complete_task(done.id).unwrap();

        assert_eq!(titles(&service), vec!["Pending"]);
    }

    #[test]
    fn completed_tasks_free_slots_for_older_ones() {
        let service = setup();
        let mut ids = Vec::new();
        for i in 1..=6 {
            ids.push(service.create_task(&NewTask::new(format!("T{i}"), "X")).unwrap().id);
        }
        service.complete_task(ids[5]).unwrap();
        assert_eq!(titles(&service), vec!["T5", "T4", "T3", "T2", "T1"]);
    }
}

mod creation {
    use super::*;

    #[test]
    fn new_task_is_first_when_fewer_than_five_exist() {
        let service = setup();
        service.create_task(&NewTask::new("A", "D")).unwrap();
        service.create_task(&NewTask::new("B", "D")).unwrap();
        let created = service.create_task(&NewTask::new("C", "D")).unwrap();

        assert_eq!(service.list_recent_pending().unwrap()[0], created);
    }

    #[test]
    fn empty_title_is_rejected_without_insert() {
        let service = setup();
        let err = service.create_task(&NewTask::new("", "D")).unwrap_err();

        assert!(matches!(err, TaskError::Validation { field: "title", .. }));
        assert_eq!(service.db().pending_count().unwrap(), 0);
    }

    #[test]
    fn empty_description_is_rejected() {
        let service = setup();
        let err = service.create_task(&NewTask::new("T", "  ")).unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "description", .. }));
    }
}

mod completion {
    use super::*;

    #[test]
    fn missing_task_is_not_found_and_store_unchanged() {
        let service = setup();
        let existing = service.create_task(&NewTask::new("Keep", "D")).unwrap();

        let err = service.complete_task(existing.id + 1_000).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));

        let stored = service.db().get_task(existing.id).unwrap().unwrap();
        assert!(!stored.status);
    }

    #[test]
    fn completion_is_idempotent() {
        let service = setup();
        let task = service.create_task(&NewTask::new("Twice", "D")).unwrap();

        service.complete_task(task.id).unwrap();
        service.complete_task(task.id).unwrap();

        assert!(service.db().get_task(task.id).unwrap().unwrap().status);
    }
}

mod file_backed {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn pooled_connections_share_one_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_path(dir.path().join("todoapp.db"), 4).unwrap();
        let service = Arc::new(TaskService::new(db));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    service
                        .create_task(&NewTask::new(format!("T{i}"), "D"))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.db().pending_count().unwrap(), 8);
        assert_eq!(service.list_recent_pending().unwrap().len(), 5);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todoapp.db");

        let id = {
            let service = TaskService::new(Database::open_path(&path, 2).unwrap());
            service.create_task(&NewTask::new("Durable", "D")).unwrap().id
        };

        let reopened = Database::open_path(&path, 2).unwrap();
        assert_eq!(reopened.get_task(id).unwrap().unwrap().title, "Durable");
    }
}
