//! Place service - the consistency coordinator.
//!
//! Every mutation that touches a place and its owner's `places` sequence runs
//! inside one unit-of-work transaction, with the owner row locked before the
//! sequence is rewritten. Concurrent creates for one owner therefore never
//! lose an append, and a second concurrent delete of the same place observes
//! `PlaceNotFound`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewPlace, Place};
use crate::errors::{AppError, AppResult};
use crate::infra::assets::{self, AssetStore};
use crate::infra::{Geocoder, UnitOfWork};
use crate::with_transaction;

/// Input for [`PlaceService::create_place`].
///
/// `image` is the path of an upload already written to the asset store.
#[derive(Debug, Clone)]
pub struct CreatePlaceInput {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub image: String,
}

/// Place service trait for dependency injection.
#[async_trait]
pub trait PlaceService: Send + Sync {
    /// Geocode, insert, and attach a place to its owner atomically.
    ///
    /// On any failure the uploaded image is discarded before returning.
    async fn create_place(&self, input: CreatePlaceInput) -> AppResult<Place>;

    /// Change title and description; only the creator may do this
    async fn update_place(
        &self,
        requester_id: Uuid,
        place_id: Uuid,
        title: String,
        description: String,
    ) -> AppResult<Place>;

    /// Remove a place and detach it from its owner atomically; only the
    /// creator may do this. The image is removed after commit, best-effort.
    async fn delete_place(&self, requester_id: Uuid, place_id: Uuid) -> AppResult<()>;

    /// Get place by ID
    async fn get_place(&self, place_id: Uuid) -> AppResult<Place>;

    /// Places owned by a user, in the order of the user's `places` sequence
    async fn get_places_by_user(&self, user_id: Uuid) -> AppResult<Vec<Place>>;
}

/// Reject blank (after trimming) required text fields.
fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Concrete implementation of PlaceService using Unit of Work.
pub struct PlaceCoordinator<U: UnitOfWork> {
    uow: Arc<U>,
    geocoder: Arc<dyn Geocoder>,
    assets: Arc<dyn AssetStore>,
}

impl<U: UnitOfWork> PlaceCoordinator<U> {
    pub fn new(uow: Arc<U>, geocoder: Arc<dyn Geocoder>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            uow,
            geocoder,
            assets,
        }
    }

    async fn load(&self, place_id: Uuid) -> AppResult<Place> {
        self.uow
            .places()
            .find_by_id(place_id)
            .await?
            .ok_or(AppError::PlaceNotFound)
    }

    async fn create_and_attach(&self, input: CreatePlaceInput) -> AppResult<Place> {
        require_text("title", &input.title)?;
        require_text("description", &input.description)?;
        require_text("address", &input.address)?;
        require_text("image", &input.image)?;

        let location = self.geocoder.resolve(&input.address).await?;

        if self.uow.users().find_by_id(input.owner_id).await?.is_none() {
            return Err(AppError::OwnerNotFound);
        }

        let owner_id = input.owner_id;
        let new_place = NewPlace {
            title: input.title,
            description: input.description,
            address: input.address,
            location,
            image: input.image,
            creator: owner_id,
        };

        let place: Place = with_transaction!(self.uow, |ctx| {
            let place = ctx.places().create(new_place).await?;

            let mut owner = ctx
                .users()
                .find_by_id_for_update(owner_id)
                .await?
                .ok_or(AppError::OwnerNotFound)?;
            owner.attach_place(place.id);
            ctx.users().save_places(owner.id, owner.places).await?;

            Ok(place)
        })?;

        tracing::info!(place_id = %place.id, owner_id = %owner_id, "Place created");
        Ok(place)
    }
}

#[async_trait]
impl<U: UnitOfWork> PlaceService for PlaceCoordinator<U> {
    async fn create_place(&self, input: CreatePlaceInput) -> AppResult<Place> {
        let image = input.image.clone();

        match self.create_and_attach(input).await {
            Ok(place) => Ok(place),
            Err(e) => {
                tracing::warn!(error = %e, "Place creation failed");
                if !image.trim().is_empty() {
                    assets::discard(self.assets.as_ref(), &image).await;
                }
                Err(e)
            }
        }
    }

    async fn update_place(
        &self,
        requester_id: Uuid,
        place_id: Uuid,
        title: String,
        description: String,
    ) -> AppResult<Place> {
        require_text("title", &title)?;
        require_text("description", &description)?;

        let place = self.load(place_id).await?;
        if !place.is_owned_by(requester_id) {
            return Err(AppError::Forbidden);
        }

        self.uow
            .places()
            .update_details(place_id, title, description)
            .await
    }

    async fn delete_place(&self, requester_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let place = self.load(place_id).await?;
        if !place.is_owned_by(requester_id) {
            return Err(AppError::Forbidden);
        }

        let owner_id = place.creator;
        with_transaction!(self.uow, |ctx| {
            // Zero rows means a concurrent delete won
            if !ctx.places().delete(place_id).await? {
                return Err(AppError::PlaceNotFound);
            }

            let mut owner = ctx
                .users()
                .find_by_id_for_update(owner_id)
                .await?
                .ok_or(AppError::OwnerNotFound)?;
            if owner.detach_place(place_id) {
                ctx.users().save_places(owner.id, owner.places).await?;
            }

            Ok(())
        })?;

        tracing::info!(place_id = %place_id, owner_id = %owner_id, "Place deleted");

        let assets = self.assets.clone();
        tokio::spawn(async move {
            assets::discard(assets.as_ref(), &place.image).await;
        });

        Ok(())
    }

    async fn get_place(&self, place_id: Uuid) -> AppResult<Place> {
        self.load(place_id).await
    }

    async fn get_places_by_user(&self, user_id: Uuid) -> AppResult<Vec<Place>> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        let mut by_id: HashMap<Uuid, Place> = self
            .uow
            .places()
            .find_by_ids(user.places.clone())
            .await?
            .into_iter()
            .map(|place| (place.id, place))
            .collect();

        Ok(user
            .places
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }
}
