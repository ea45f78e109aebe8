use axum::{
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::error::{AppError, EMAIL_TAKEN_MESSAGE};
use crate::extractors::auth::{AuthUser, end_session, start_session};
use crate::extractors::form::AppForm;
use crate::flash::{self, Flash};
use crate::models::auth::{
    LoginForm, RegisterForm, normalize_email, validate_login_form, validate_register_form,
};
use crate::repo;
use crate::state::AppState;
use crate::utils::{hash, jwt};
use crate::views;

pub async fn register_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    (jar, views::register(&flashes))
}

/// Handle account creation.
#[instrument(skip(state, jar, form), fields(email = %normalize_email(&form.email)))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppForm(form): AppForm<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let account = validate_register_form(&form)?;

    if repo::find_user_by_email(&state.db, &account.email)
        .await?
        .is_some()
    {
        info!("Registration attempted for an existing email");
        return Err(AppError::Conflict {
            message: EMAIL_TAKEN_MESSAGE.into(),
            redirect_to: "/login".into(),
        });
    }

    let hash = hash::hash_password(&form.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let user = repo::create_user(&state.db, &account.name, &account.email, &hash).await?;
    info!(user_id = user.id, "Account created");

    let jar = flash::push(
        jar,
        Flash::success("Account created successfully! Please log in."),
    );
    Ok((jar, Redirect::to("/login")))
}

pub async fn login_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    (jar, views::login(&flashes))
}

/// Handle login. Unknown email and wrong password produce the same response.
#[instrument(skip(state, jar, form), fields(email = %normalize_email(&form.email)))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppForm(form): AppForm<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let email = validate_login_form(&form)?;

    let Some(user) = repo::find_user_by_email(&state.db, &email).await? else {
        warn!("Login failed: invalid credentials");
        return Err(AppError::InvalidCredentials);
    };

    let is_valid = hash::verify_password(&form.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        warn!("Login failed: invalid credentials");
        return Err(AppError::InvalidCredentials);
    }

    let auth = &state.config.auth;
    let token = jwt::sign(
        user.id,
        &user.email,
        &auth.session_secret,
        auth.session_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("Session sign error: {}", e)))?;

    info!(user_id = user.id, "User logged in");
    let jar = flash::push(start_session(jar, token), Flash::success("Login successful!"));
    Ok((jar, Redirect::to("/dashboard")))
}

/// End the session.
#[instrument(skip(auth_user, jar), fields(user_id = auth_user.user_id))]
pub async fn logout(auth_user: AuthUser, jar: CookieJar) -> (CookieJar, Redirect) {
    info!("User logged out");
    let jar = flash::push(end_session(jar), Flash::info("Logged out successfully."));
    (jar, Redirect::to("/login"))
}
