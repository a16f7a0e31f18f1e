//! Unit of Work pattern implementation.
//!
//! Every write that touches both collections (a place row and its owner's
//! `places` sequence) runs through [`UnitOfWork::transaction`], so either both
//! writes are committed or neither is visible.
//!
//! Concurrent mutations of the same owner are serialized by locking the owner
//! row (`find_by_id_for_update`) inside the transaction; the lock is released
//! on commit or rollback.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use super::repositories::{
    PlaceRepository, PlaceStore, TxPlaceRepository, TxUserRepository, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// Tests substitute an in-memory implementation instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository (outside any transaction)
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get place repository (outside any transaction)
    fn places(&self) -> Arc<dyn PlaceRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise. A
    /// failure to begin or commit, a storage error raised inside the body, or
    /// exceeding the configured deadline all surface as
    /// [`AppError::TransactionFailed`]; domain errors raised by the body pass
    /// through unchanged.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same transaction.
pub struct TransactionContext<'a> {
    users: &'a dyn UserRepository,
    places: &'a dyn PlaceRepository,
}

impl<'a> TransactionContext<'a> {
    /// Create a new transaction context over transaction-bound repositories
    pub fn new(users: &'a dyn UserRepository, places: &'a dyn PlaceRepository) -> Self {
        Self { users, places }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> &'a dyn UserRepository {
        self.users
    }

    /// Get place repository for this transaction
    pub fn places(&self) -> &'a dyn PlaceRepository {
        self.places
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    place_repo: Arc<PlaceStore>,
    timeout: Duration,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let place_repo = Arc::new(PlaceStore::new(db.clone()));
        Self {
            db,
            user_repo,
            place_repo,
            timeout,
        }
    }

    async fn execute_transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(|e| AppError::TransactionFailed(format!("begin: {e}")))?;

        let outcome = {
            let users = TxUserRepository::new(&txn);
            let places = TxPlaceRepository::new(&txn);
            f(TransactionContext::new(&users, &places)).await
        };

        finish(txn, outcome).await
    }
}

/// Commit on success, roll back on error.
async fn finish<T>(txn: DatabaseTransaction, outcome: AppResult<T>) -> AppResult<T> {
    match outcome {
        Ok(result) => {
            txn.commit()
                .await
                .map_err(|e| AppError::TransactionFailed(format!("commit: {e}")))?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e.into_transaction_failure())
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn places(&self) -> Arc<dyn PlaceRepository> {
        self.place_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        // Dropping an unfinished DatabaseTransaction rolls it back
        match tokio::time::timeout(self.timeout, self.execute_transaction(f)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Transaction deadline exceeded");
                Err(AppError::TransactionFailed(format!(
                    "deadline of {:?} exceeded",
                    self.timeout
                )))
            }
        }
    }
}

/// Simpler API for executing transactional operations.
///
/// Captured values are moved into the body; pass owned data (ids, clones).
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(move |$ctx| Box::pin(async move { $body })).await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::entities::user;
    use crate::with_transaction;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use uuid::Uuid;

    fn persistence(db: MockDatabase, timeout: Duration) -> (Persistence, DatabaseConnection) {
        let conn = db.into_connection();
        (Persistence::new(conn.clone(), timeout), conn)
    }

    fn logged_sql(conn: DatabaseConnection) -> Vec<String> {
        conn.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_success_commits() {
        let (uow, conn) = persistence(
            MockDatabase::new(DatabaseBackend::Postgres),
            Duration::from_secs(1),
        );

        let value: u32 = with_transaction!(uow, |_ctx| Ok(7)).unwrap();

        assert_eq!(value, 7);
        assert_eq!(logged_sql(conn), vec!["BEGIN", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_domain_error_rolls_back_unchanged() {
        let (uow, conn) = persistence(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            Duration::from_secs(1),
        );
        let owner_id = Uuid::new_v4();

        let result: AppResult<()> = with_transaction!(uow, |ctx| {
            ctx.users()
                .find_by_id_for_update(owner_id)
                .await?
                .ok_or(AppError::OwnerNotFound)?;
            Ok(())
        });

        assert!(matches!(result, Err(AppError::OwnerNotFound)));
        let sql = logged_sql(conn);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert!(sql[1].ends_with("FOR UPDATE"));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"));
    }

    #[tokio::test]
    async fn test_storage_error_rolls_back_as_transaction_failed() {
        let (uow, conn) = persistence(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())]),
            Duration::from_secs(1),
        );
        let owner_id = Uuid::new_v4();

        let result: AppResult<()> = with_transaction!(uow, |ctx| {
            ctx.users().find_by_id_for_update(owner_id).await?;
            Ok(())
        });

        assert!(matches!(result, Err(AppError::TransactionFailed(_))));
        let sql = logged_sql(conn);
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"));
    }

    #[tokio::test]
    async fn test_deadline_exceeded_is_transaction_failed() {
        let (uow, conn) = persistence(
            MockDatabase::new(DatabaseBackend::Postgres),
            Duration::from_millis(10),
        );

        let result: AppResult<()> = with_transaction!(uow, |_ctx| {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(())
        });

        match result {
            Err(AppError::TransactionFailed(detail)) => assert!(detail.contains("deadline")),
            other => panic!("expected TransactionFailed, got {other:?}"),
        }
        let sql = logged_sql(conn);
        assert_eq!(sql, vec!["BEGIN", "ROLLBACK"]);
    }
}
