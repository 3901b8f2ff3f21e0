//! A small helpdesk: tickets, comments on tickets, and the HTTP controllers
//! that list, create, edit and delete them.

pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod extract;
pub mod forms;
pub mod models;
pub mod paging;
pub mod repository;
pub mod view;

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use axum::Router;

use db::Database;
use paging::PagingConfig;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    pub paging: PagingConfig,
}

impl AppState {
    pub fn new(db: Database, paging: PagingConfig) -> Self {
        AppState {
            db: Arc::new(Mutex::new(db)),
            paging,
        }
    }

    /// Run `f` with exclusive access to the database on the blocking pool,
    /// keeping SQLite I/O and lock waits off the async workers.
    pub async fn with_db<T, F>(&self, f: F) -> error::Result<T>
    where
        F: FnOnce(&Database) -> error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|e| anyhow!("database lock poisoned: {}", e))?;
            f(&*db)
        })
        .await
        .map_err(|e| anyhow!("database task failed: {}", e))?
    }
}

/// Build the application router over `state`.
pub fn app(state: AppState) -> Router {
    controllers::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::TicketForm;
    use crate::paging::PageRequest;
    use crate::repository::TicketRepository;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_with_db_shares_one_connection() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let state = AppState::new(db, PagingConfig::default());
        let clone = state.clone();
        let form = TicketForm {
            issue: "Shared".to_string(),
            issue_details: None,
        };

        let saved = state
            .with_db(move |db| Ok(db.tickets().save(form.to_ticket())?))
            .await
            .unwrap();
        let id = saved.id;
        let found = clone
            .with_db(move |db| Ok(db.tickets().find_by_id(id)?))
            .await
            .unwrap();

        assert_eq!(found, Some(saved));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writes_all_land() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let state = AppState::new(db, PagingConfig::default());

        let mut handles = Vec::new();
        for i in 0..16 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                let form = TicketForm {
                    issue: format!("Ticket {}", i),
                    issue_details: None,
                };
                state
                    .with_db(move |db| Ok(db.tickets().save(form.to_ticket())?))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let total = state
            .with_db(|db| Ok(db.tickets().find_all(&PageRequest::default())?.total_elements))
            .await
            .unwrap();
        assert_eq!(total, 16);
    }

    #[tokio::test]
    async fn test_panicking_closure_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let state = AppState::new(db, PagingConfig::default());

        let result: error::Result<()> = state.with_db(|_| panic!("boom")).await;
        assert!(matches!(result, Err(error::AppError::Storage(_))));
    }
}
