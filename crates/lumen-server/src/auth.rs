//! # Authentication
//!
//! A single shared password guards every route except health and public
//! downloads. Clients present it on each request, either as HTTP Basic
//! credentials (the username is ignored) or as a bearer token.
//!
//! ## Hash format
//!
//! `password_hash` holds an Argon2id PHC string, e.g.
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
//! ```
//!
//! The cost parameters travel inside the string, so hashes made with other
//! parameters keep verifying.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::headers::authorization::{Basic, Bearer};
use axum_extra::headers::{Authorization, HeaderMapExt};
use lumen_core::error::LumenError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried the correct password.
///
/// Handlers take this as an argument; the check runs per request and keeps
/// no session.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(stored) = state.config.password_hash.clone() else {
            tracing::warn!(uri = %parts.uri, "no password configured, refusing request");
            return Err(AppError::Unauthorized);
        };
        let Some(presented) = presented_password(&parts.headers) else {
            tracing::debug!(uri = %parts.uri, "request without credentials");
            return Err(AppError::Unauthorized);
        };
        // argon2 is deliberately slow; keep it off the async workers
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&stored, &presented)).await?;
        if verified {
            Ok(Authenticated)
        } else {
            tracing::warn!(uri = %parts.uri, "invalid credentials");
            Err(AppError::Unauthorized)
        }
    }
}

fn presented_password(headers: &HeaderMap) -> Option<String> {
    if let Some(basic) = headers.typed_get::<Authorization<Basic>>() {
        return Some(basic.password().to_string());
    }
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|bearer| bearer.token().to_string())
}

/// Hash `password` with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, LumenError> {
    hash_password_with(password, Params::default())
}

/// Hash with explicit Argon2 cost parameters.
pub fn hash_password_with(password: &str, params: Params) -> Result<String, LumenError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LumenError::Config {
            message: format!("could not hash password: {e}"),
        })
}

/// Check `password` against a stored PHC string.
///
/// Malformed hashes never verify.
pub fn verify_password(stored: &str, password: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("configured password_hash is not a valid PHC string: {e}");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
