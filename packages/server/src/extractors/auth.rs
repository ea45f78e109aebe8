use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;
use crate::repo;
use crate::state::AppState;
use crate::utils::jwt;

pub const SESSION_COOKIE: &str = "session";

/// The signed-in user, resolved from the `session` cookie.
///
/// Add this as a handler parameter to require authentication; anonymous
/// callers are redirected to the login page before the handler runs. Use
/// `Option<AuthUser>` on pages that only adapt to the session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub name: String,
    pub email: String,
}

impl AuthUser {
    async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<Self>, AppError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok(None);
        };

        let Ok(claims) = jwt::verify(&token, &state.config.auth.session_secret) else {
            tracing::debug!("Ignoring invalid or expired session token");
            return Ok(None);
        };

        // The session only names the user; the row must still exist.
        let user = repo::find_user_by_id(&state.db, claims.uid).await?;
        Ok(user.map(|user| AuthUser {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::resolve(parts, state)
            .await?
            .ok_or(AppError::LoginRequired)
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Self::resolve(parts, state).await
    }
}

/// Attach a freshly signed session token.
pub fn start_session(jar: CookieJar, token: String) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Expire the session cookie on the client.
pub fn end_session(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    jar.add(cookie)
}
