use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DbErr;

use crate::extractors::auth::end_session;
use crate::flash::{Deferred, Flash};
use crate::repo::RepoError;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
pub const EMAIL_TAKEN_MESSAGE: &str = "Email already registered. Please log in.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Application-level error type.
///
/// Every variant ends in a redirect carrying a flash message; nothing here
/// produces a bare error status.
#[derive(Debug)]
pub enum AppError {
    /// Bad form input or a rejected upload. Nothing was written.
    Validation {
        message: String,
        redirect_to: String,
    },
    /// The request collides with existing state, e.g. a registered email.
    Conflict {
        message: String,
        redirect_to: String,
    },
    /// No valid session.
    LoginRequired,
    InvalidCredentials,
    /// The resource does not exist or belongs to someone else.
    AccessDenied(String),
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }

    fn flash_and_target(self) -> (Flash, String) {
        match self {
            AppError::Validation {
                message,
                redirect_to,
            }
            | AppError::Conflict {
                message,
                redirect_to,
            } => (Flash::warning(message), redirect_to),
            AppError::LoginRequired => (Flash::info(LOGIN_REQUIRED_MESSAGE), "/login".into()),
            AppError::InvalidCredentials => {
                (Flash::danger(INVALID_CREDENTIALS_MESSAGE), "/login".into())
            }
            AppError::AccessDenied(message) => (Flash::danger(message), "/dashboard".into()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (Flash::danger(INTERNAL_ERROR_MESSAGE), "/".into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let clears_session = matches!(self, AppError::LoginRequired);
        let (message, target) = self.flash_and_target();

        let mut response = if clears_session {
            (end_session(CookieJar::new()), Redirect::to(&target)).into_response()
        } else {
            Redirect::to(&target).into_response()
        };
        response.extensions_mut().insert(Deferred(message));
        response
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::EmailTaken => {
                tracing::debug!("Registration race: unique constraint caught on insert");
                AppError::Conflict {
                    message: EMAIL_TAKEN_MESSAGE.into(),
                    redirect_to: "/login".into(),
                }
            }
            RepoError::Db(e) => AppError::from(e),
        }
    }
}
