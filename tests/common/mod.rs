//! Shared test doubles: an in-memory unit of work with real commit and
//! rollback semantics, a scripted geocoder and a recording asset store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use uuid::Uuid;

use places_api::config::{Config, HashingCost};
use places_api::domain::{Coordinates, NewPlace, NewUser, Place, User};
use places_api::errors::{AppError, AppResult};
use places_api::infra::{
    AssetStore, Geocoder, PlaceRepository, TransactionContext, TxFuture, UnitOfWork,
    UserRepository,
};

pub const TEST_SECRET: &str = "integration-test-secret-long-enough!!";

/// Config with a cheap argon2 cost so tests stay fast
pub fn test_config() -> Config {
    let mut config = Config::new(TEST_SECRET).expect("test secret is long enough");
    config.hashing = HashingCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config
}

// =============================================================================
// In-memory stores
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub users: HashMap<Uuid, User>,
    pub places: HashMap<Uuid, Place>,
}

/// Switches for injecting storage failures
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_place_insert: AtomicBool,
    pub fail_next_commit: AtomicBool,
}

fn storage_error(what: &str) -> AppError {
    AppError::PersistenceFailed(DbErr::Custom(format!("injected {what} failure")))
}

pub struct MemoryUserRepository {
    state: Arc<Mutex<MemoryState>>,
}

pub struct MemoryPlaceRepository {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_by_id_for_update(&self, id: Uuid) -> AppResult<Option<User>> {
        // The unit of work serializes whole transactions, which subsumes row locks
        self.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.state.lock().unwrap().users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            image: user.image,
            places: Vec::new(),
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save_places(&self, id: Uuid, places: Vec<Uuid>) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();
        let user = state.users.get_mut(&id).ok_or(AppError::OwnerNotFound)?;
        user.places = places;
        Ok(user.clone())
    }
}

#[async_trait]
impl PlaceRepository for MemoryPlaceRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>> {
        Ok(self.state.lock().unwrap().places.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Place>> {
        let state = self.state.lock().unwrap();
        Ok(ids.iter().filter_map(|id| state.places.get(id).cloned()).collect())
    }

    async fn create(&self, place: NewPlace) -> AppResult<Place> {
        if self.faults.fail_place_insert.load(Ordering::SeqCst) {
            return Err(storage_error("place insert"));
        }

        let now = Utc::now();
        let created = Place {
            id: Uuid::new_v4(),
            title: place.title,
            description: place.description,
            address: place.address,
            location: place.location,
            image: place.image,
            creator: place.creator,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .places
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_details(
        &self,
        id: Uuid,
        title: String,
        description: String,
    ) -> AppResult<Place> {
        let mut state = self.state.lock().unwrap();
        let place = state.places.get_mut(&id).ok_or(AppError::PlaceNotFound)?;
        place.title = title;
        place.description = description;
        place.updated_at = Utc::now();
        Ok(place.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().places.remove(&id).is_some())
    }
}

/// Unit of work over [`MemoryState`].
///
/// Transactions run one at a time on a private copy of the committed state;
/// the copy replaces the committed state only on success. Writes made
/// outside a transaction go straight to the committed state and must not
/// race a running transaction.
pub struct MemoryUnitOfWork {
    committed: Arc<Mutex<MemoryState>>,
    gate: tokio::sync::Mutex<()>,
    pub faults: Arc<Faults>,
    hold: Duration,
}

impl Default for MemoryUnitOfWork {
    fn default() -> Self {
        Self {
            committed: Arc::new(Mutex::new(MemoryState::default())),
            gate: tokio::sync::Mutex::new(()),
            faults: Arc::new(Faults::default()),
            hold: Duration::ZERO,
        }
    }
}

impl MemoryUnitOfWork {
    /// Sleep inside every transaction body, widening race windows
    pub fn holding(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> MemoryState {
        self.committed.lock().unwrap().clone()
    }

    /// Insert a user directly into the committed state
    pub fn seed_user(&self, name: &str, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            image: format!("uploads/images/{name}.png"),
            places: Vec::new(),
            created_at: Utc::now(),
        };
        self.committed
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(MemoryUserRepository {
            state: self.committed.clone(),
        })
    }

    fn places(&self) -> Arc<dyn PlaceRepository> {
        Arc::new(MemoryPlaceRepository {
            state: self.committed.clone(),
            faults: self.faults.clone(),
        })
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let _guard = self.gate.lock().await;

        let staged = Arc::new(Mutex::new(self.snapshot()));
        let users = MemoryUserRepository {
            state: staged.clone(),
        };
        let places = MemoryPlaceRepository {
            state: staged.clone(),
            faults: self.faults.clone(),
        };

        let outcome = f(TransactionContext::new(&users, &places)).await;
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }

        match outcome {
            Ok(value) => {
                if self.faults.fail_next_commit.swap(false, Ordering::SeqCst) {
                    return Err(AppError::TransactionFailed(
                        "injected commit failure".to_string(),
                    ));
                }
                let staged = staged.lock().unwrap().clone();
                *self.committed.lock().unwrap() = staged;
                Ok(value)
            }
            Err(e) => Err(e.into_transaction_failure()),
        }
    }
}

// =============================================================================
// Geocoder and asset doubles
// =============================================================================

/// Geocoder answering from a fixed table; unknown addresses are not found.
#[derive(Default)]
pub struct StubGeocoder {
    answers: HashMap<String, AppResult<Coordinates>>,
    pub calls: Mutex<Vec<String>>,
}

impl StubGeocoder {
    pub fn with(mut self, address: &str, lat: f64, lon: f64) -> Self {
        self.answers
            .insert(address.to_string(), Ok(Coordinates { lat, lon }));
        self
    }

    pub fn unavailable(mut self, address: &str) -> Self {
        self.answers
            .insert(address.to_string(), Err(AppError::upstream("stub outage")));
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, address: &str) -> AppResult<Coordinates> {
        self.calls.lock().unwrap().push(address.to_string());
        match self.answers.get(address) {
            Some(Ok(coordinates)) => Ok(*coordinates),
            Some(Err(AppError::UpstreamUnavailable(detail))) => {
                Err(AppError::upstream(detail.clone()))
            }
            _ => Err(AppError::LocationNotFound),
        }
    }
}

/// Asset store that keeps files in memory and records removals.
#[derive(Default)]
pub struct RecordingAssets {
    pub stored: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
}

impl RecordingAssets {
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    /// Wait for a removal performed by a spawned task
    pub async fn wait_for_removal(&self, path: &str) -> bool {
        for _ in 0..50 {
            if self.removed().iter().any(|p| p == path) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

#[async_trait]
impl AssetStore for RecordingAssets {
    async fn store(&self, ext: &str, _bytes: Vec<u8>) -> AppResult<String> {
        let path = format!("uploads/images/{}.{}", Uuid::new_v4(), ext);
        self.stored.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }
}
