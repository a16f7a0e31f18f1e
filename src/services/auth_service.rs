//! Authentication service - accounts, credentials and bearer tokens.
//!
//! Password handling lives in the domain `Password` value object; this
//! service owns the token codec and the account use cases built on it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::config::{Config, BEARER_TOKEN_PREFIX, MIN_PASSWORD_LENGTH, TOKEN_VALIDITY_SECONDS};
use crate::domain::{normalize_email, NewUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::assets::{self, AssetStore};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token and the instant it stops being accepted
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Returned by signup and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub user_id: Uuid,
    #[schema(example = "ann@x.com")]
    pub email: String,
    /// HS256 bearer token, valid for one hour
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The acting user, as established by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Signup input. `image` is the path of an avatar already written to the
/// asset store; it is discarded if signup fails.
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and sign them in
    async fn signup(&self, input: SignupInput) -> AppResult<AuthResponse>;

    /// Check credentials and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Verify a raw `Authorization` header value
    fn authenticate(&self, raw: Option<&str>) -> AppResult<Identity>;

    /// Sign a token for the given user
    fn issue_token(&self, user_id: Uuid, email: &str) -> AppResult<IssuedToken>;
}

/// Sign an HS256 token valid for `TOKEN_VALIDITY_SECONDS`.
fn sign_token(user_id: Uuid, email: &str, config: &Config) -> AppResult<IssuedToken> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(TOKEN_VALIDITY_SECONDS);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )
    .map_err(|e| AppError::TokenIssuanceFailed(e.to_string()))?;

    // Report the second-truncated instant actually encoded in `exp`
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .unwrap_or(expires_at);

    Ok(IssuedToken { token, expires_at })
}

/// Decode and validate a bare token; every failure is `Unauthenticated`.
fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthenticated
    })
}

fn validate_signup(input: &SignupInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if !input.email.trim().validate_email() {
        return Err(AppError::validation("Email must be a valid address"));
    }
    if input.password.chars().count() < MIN_PASSWORD_LENGTH as usize {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    assets: Arc<dyn AssetStore>,
    dummy_hash: OnceCell<Password>,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            uow,
            config,
            assets,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Hash verified against when the email is unknown, built with the
    /// configured cost so both paths take comparable time.
    fn dummy_hash(&self) -> AppResult<&Password> {
        self.dummy_hash
            .get_or_try_init(|| Password::new("dummy-password-for-timing", &self.config.hashing))
    }

    async fn register(&self, input: SignupInput) -> AppResult<AuthResponse> {
        validate_signup(&input)?;
        let email = normalize_email(&input.email);

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = Password::new(&input.password, &self.config.hashing)?.into_string();

        let user = self
            .uow
            .users()
            .create(NewUser {
                name: input.name.trim().to_string(),
                email,
                password_hash,
                image: input.image,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User signed up");
        self.respond(&user)
    }

    fn respond(&self, user: &User) -> AppResult<AuthResponse> {
        let issued = sign_token(user.id, &user.email, &self.config)?;
        Ok(AuthResponse {
            user_id: user.id,
            email: user.email.clone(),
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(&self, input: SignupInput) -> AppResult<AuthResponse> {
        let image = input.image.clone();
        let result = self.register(input).await;

        if let Err(ref e) = result {
            tracing::debug!(error = %e, "Signup failed, discarding avatar");
            assets::discard(self.assets.as_ref(), &image).await;
        }
        result
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let email = normalize_email(&email);
        let user = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash when the email is unknown so response
        // time does not reveal which addresses are registered.
        let matches = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()).verify(&password)?,
            None => {
                let _ = self.dummy_hash()?.verify(&password);
                false
            }
        };

        match user {
            Some(user) if matches => self.respond(&user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn authenticate(&self, raw: Option<&str>) -> AppResult<Identity> {
        let token = raw
            .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        let claims = verify_token(token, &self.config)?;
        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
        })
    }

    fn issue_token(&self, user_id: Uuid, email: &str) -> AppResult<IssuedToken> {
        sign_token(user_id, email, &self.config)
    }
}
