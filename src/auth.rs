use std::convert::Infallible;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    errors::AppError,
    flash::{self, Flash},
    repository::RepositoryState,
};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "restaurant_session";

/// Where gated routes send anonymous visitors.
pub const SIGN_IN_PATH: &str = "/users/sign_in";

/// Claims
///
/// Payload of the session token. Signed with `AppConfig::session_secret` and
/// validated on every request that asks for an `AuthUser`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the id of the signed-in user.
    pub sub: Uuid,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
    /// Issued at (seconds since the epoch).
    pub iat: usize,
}

/// AuthUser
///
/// The actor of a request: the signed-in user resolved from the session cookie.
/// Handlers that take `AuthUser` are only reachable with a valid session; handlers
/// that take `Option<AuthUser>` render for visitors and members alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Signs a session token for `user_id` that expires after the configured TTL.
pub fn issue_session_token(user_id: Uuid, config: &AppConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp().max(0) as usize;
    let ttl = usize::try_from(config.session_ttl_secs).unwrap_or(usize::MAX);
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now.saturating_add(ttl),
    };
    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Starts a session for `user_id` by setting the session cookie.
pub fn start_session(cookies: &Cookies, user_id: Uuid, config: &AppConfig) -> Result<(), AppError> {
    let token = issue_session_token(user_id, config)?;
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.env == Env::Production);
    cookies.add(cookie);
    Ok(())
}

/// Ends the current session, if any.
pub fn end_session(cookies: &Cookies) {
    if cookies.get(SESSION_COOKIE).is_some() {
        let mut cookie = Cookie::from(SESSION_COOKIE);
        cookie.set_path("/");
        cookies.remove(cookie);
    }
}

/// Hashes a plaintext password into an Argon2id PHC string with a fresh salt.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Checks a plaintext password against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("stored password hash is malformed: {e}");
            false
        }
    }
}

/// Decodes and validates a session token, returning the subject.
pub fn decode_session_token(token: &str, config: &AppConfig) -> Option<Uuid> {
    let key = DecodingKey::from_secret(config.session_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            // Expired, forged and malformed tokens all mean "anonymous".
            tracing::debug!("rejected session token: {e}");
            None
        }
    }
}

/// Resolves the actor of a request, or None for anonymous visitors.
///
/// 0. An actor already stored in the request extensions wins.
/// 1. Local bypass: in `Env::Local` an `x-user-id` header naming an existing user
///    authenticates the request.
/// 2. Session cookie: the token must verify and its subject must still exist.
async fn resolve_actor<S>(parts: &mut Parts, state: &S) -> Option<AuthUser>
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    // Already resolved by the session gate.
    if let Some(actor) = parts.extensions.get::<AuthUser>() {
        return Some(actor.clone());
    }

    let repo = RepositoryState::from_ref(state);
    let config = AppConfig::from_ref(state);

    let user_id = match bypass_user_id(parts, &config) {
        Some(id) => id,
        None => {
            let cookies = <Cookies as FromRequestParts<S>>::from_request_parts(parts, state)
                .await
                .ok()?;
            let token = cookies.get(SESSION_COOKIE)?;
            decode_session_token(token.value(), &config)?
        }
    };

    // The account may have disappeared after the token was issued.
    match repo.get_user(user_id).await {
        Ok(Some(user)) => Some(AuthUser {
            id: user.id,
            email: user.email,
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::error!("session user lookup failed: {e}");
            None
        }
    }
}

fn bypass_user_id(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    if config.env != Env::Local {
        return None;
    }
    let raw = parts.headers.get("x-user-id")?.to_str().ok()?;
    Uuid::parse_str(raw).ok()
}

/// Gated extractor: anonymous visitors are redirected to the sign-in page with an alert.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(actor) = resolve_actor(parts, state).await {
            return Ok(actor);
        }

        tracing::debug!(uri = %parts.uri, "anonymous request to a gated route");
        if let Ok(cookies) = <Cookies as FromRequestParts<S>>::from_request_parts(parts, state).await
        {
            flash::set(&cookies, Flash::SignInRequired);
        }
        Err(Redirect::to(SIGN_IN_PATH))
    }
}

/// Optional extractor: `Option<AuthUser>` is None for anonymous visitors.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(resolve_actor(parts, state).await)
    }
}
