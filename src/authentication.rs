use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Extension;
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, error};

use crate::{
    config::Config,
    db_helpers::{get_live_session, get_user_by_id},
    errors::RequestError,
    models::{Role, User},
};

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    sid: String,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub session_id: String,
}

impl AuthUser {
    /// Loads the caller's user row and fails unless it carries the admin role.
    pub async fn require_admin(&self, pool: &SqlitePool) -> Result<User, RequestError> {
        let user = get_user_by_id(pool, self.id)
            .await?
            .ok_or(RequestError::NotAuthorized("Account no longer exists"))?;
        if user.role != Role::Admin {
            return Err(RequestError::Forbidden);
        }
        Ok(user)
    }
}

/// The caller, if an Authorization header was sent. A header that fails to verify is rejected.
pub struct MaybeUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Ok(MaybeUser(None)),
        };
        let header = header.to_str().map_err(|_| {
            debug!("Authorization header is not valid ascii");
            RequestError::NotAuthorized("Invalid token")
        })?;

        let token = match header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("Token "))
        {
            Some(token) => token.to_owned(),
            None => {
                debug!("Authorization header has an unknown scheme");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let Extension(config) = Extension::<Arc<Config>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                error!("Config extension missing: {}", e);
                RequestError::ServerError
            })?;
        let Extension(pool) = Extension::<Arc<SqlitePool>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                error!("Database extension missing: {}", e);
                RequestError::ServerError
            })?;

        let (id, session_id) = verify_jwt_token(&config.jwt_secret, &token)?;
        match get_live_session(&pool, &session_id).await? {
            Some(session) if session.user_id == id => Ok(MaybeUser(Some(AuthUser {
                id,
                session_id,
            }))),
            _ => Err(RequestError::NotAuthorized("Session expired")),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(user),
            MaybeUser(None) => Err(RequestError::NotAuthorized("Need to be authorized")),
        }
    }
}

pub fn generate_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn get_jwt_token(
    secret: &str,
    id: i64,
    session_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<String> {
    let claim = AuthClaim {
        id,
        sid: session_id.to_owned(),
        exp: expires_at.timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(secret: &str, token: &str) -> Result<(i64, String), RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        debug!("Error verifying token: {}", e);
        RequestError::NotAuthorized("Invalid Token")
    })?;
    let claim = token_data.claims;
    if claim.exp < Utc::now().timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok((claim.id, claim.sid))
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Stored password hash is malformed"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}
