//! Place store - place records with their denormalized creator.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::place::{self, ActiveModel, Entity as PlaceEntity};
use crate::domain::{NewPlace, Place};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Place repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Find place by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>>;

    /// Find all places whose id is in `ids` (any order)
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Place>>;

    /// Insert a new place
    async fn create(&self, place: NewPlace) -> AppResult<Place>;

    /// Update title and description
    async fn update_details(&self, id: Uuid, title: String, description: String)
        -> AppResult<Place>;

    /// Delete by ID, returning whether a row was removed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Pool-backed place store
pub struct PlaceStore {
    db: DatabaseConnection,
}

impl PlaceStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Place store bound to an open transaction
pub struct TxPlaceRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxPlaceRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl PlaceRepository for PlaceStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>> {
        queries::find_by_id(&self.db, id).await
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Place>> {
        queries::find_by_ids(&self.db, ids).await
    }

    async fn create(&self, place: NewPlace) -> AppResult<Place> {
        queries::create(&self.db, place).await
    }

    async fn update_details(
        &self,
        id: Uuid,
        title: String,
        description: String,
    ) -> AppResult<Place> {
        queries::update_details(&self.db, id, title, description).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        queries::delete(&self.db, id).await
    }
}

#[async_trait]
impl<'a> PlaceRepository for TxPlaceRepository<'a> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>> {
        queries::find_by_id(self.txn, id).await
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Place>> {
        queries::find_by_ids(self.txn, ids).await
    }

    async fn create(&self, place: NewPlace) -> AppResult<Place> {
        queries::create(self.txn, place).await
    }

    async fn update_details(
        &self,
        id: Uuid,
        title: String,
        description: String,
    ) -> AppResult<Place> {
        queries::update_details(self.txn, id, title, description).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        queries::delete(self.txn, id).await
    }
}

mod queries {
    use super::*;

    pub(super) async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> AppResult<Option<Place>> {
        let result = PlaceEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Place::from))
    }

    pub(super) async fn find_by_ids<C: ConnectionTrait>(
        db: &C,
        ids: Vec<Uuid>,
    ) -> AppResult<Vec<Place>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = PlaceEntity::find()
            .filter(place::Column::Id.is_in(ids))
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Place::from).collect())
    }

    pub(super) async fn create<C: ConnectionTrait>(db: &C, place: NewPlace) -> AppResult<Place> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(place.title),
            description: Set(place.description),
            address: Set(place.address),
            lat: Set(place.location.lat),
            lon: Set(place.location.lon),
            image: Set(place.image),
            creator: Set(place.creator),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(AppError::from)?;
        Ok(Place::from(model))
    }

    pub(super) async fn update_details<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        title: String,
        description: String,
    ) -> AppResult<Place> {
        let active = ActiveModel {
            id: Set(id),
            title: Set(title),
            description: Set(description),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        match active.update(db).await {
            Ok(model) => Ok(Place::from(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::PlaceNotFound),
            Err(e) => Err(AppError::from(e)),
        }
    }

    pub(super) async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<bool> {
        let result = PlaceEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
