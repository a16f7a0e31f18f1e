//! Identity store - user records and their owned-place back-references.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// The `places` sequence is written only through `save_places`, and only the
/// place coordinator calls it, inside a unit of work.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by ID and lock the row until the surrounding transaction ends
    async fn find_by_id_for_update(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List all users
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Create a new user with an empty places sequence
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Replace the owned-place sequence of a user
    async fn save_places(&self, id: Uuid, places: Vec<Uuid>) -> AppResult<User>;
}

/// Pool-backed identity store
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Identity store bound to an open transaction
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        queries::find_by_id(&self.db, id, false).await
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> AppResult<Option<User>> {
        queries::find_by_id(&self.db, id, true).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        queries::find_by_email(&self.db, email).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        queries::list(&self.db).await
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        queries::create(&self.db, user).await
    }

    async fn save_places(&self, id: Uuid, places: Vec<Uuid>) -> AppResult<User> {
        queries::save_places(&self.db, id, places).await
    }
}

#[async_trait]
impl<'a> UserRepository for TxUserRepository<'a> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        queries::find_by_id(self.txn, id, false).await
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> AppResult<Option<User>> {
        queries::find_by_id(self.txn, id, true).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        queries::find_by_email(self.txn, email).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        queries::list(self.txn).await
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        queries::create(self.txn, user).await
    }

    async fn save_places(&self, id: Uuid, places: Vec<Uuid>) -> AppResult<User> {
        queries::save_places(self.txn, id, places).await
    }
}

/// Queries shared by the pool-backed and transaction-bound stores.
mod queries {
    use super::*;

    pub(super) async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        lock: bool,
    ) -> AppResult<Option<User>> {
        let mut select = UserEntity::find_by_id(id);
        if lock {
            select = select.lock_exclusive();
        }

        let result = select.one(db).await.map_err(AppError::from)?;
        Ok(result.map(User::from))
    }

    pub(super) async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    pub(super) async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    pub(super) async fn create<C: ConnectionTrait>(db: &C, user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            image: Set(user.image),
            places: Set(Vec::new()),
            created_at: Set(chrono::Utc::now()),
        };

        match active_model.insert(db).await {
            Ok(model) => Ok(User::from(model)),
            Err(e) => Err(map_insert_error(e)),
        }
    }

    pub(super) async fn save_places<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        places: Vec<Uuid>,
    ) -> AppResult<User> {
        let active = ActiveModel {
            id: Set(id),
            places: Set(places),
            ..Default::default()
        };

        match active.update(db).await {
            Ok(model) => Ok(User::from(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::OwnerNotFound),
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// A unique violation on insert can only come from the email index
    fn map_insert_error(err: DbErr) -> AppError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateEmail,
            _ => AppError::from(err),
        }
    }
}
