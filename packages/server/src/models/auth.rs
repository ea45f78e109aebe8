use serde::Deserialize;

use crate::error::AppError;

const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 100;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 128;

/// Registration form fields.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated registration input with the email normalized.
#[derive(Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
}

pub fn validate_register_form(form: &RegisterForm) -> Result<NewAccount, AppError> {
    let invalid = |message: &str| AppError::validation(message, "/register");

    let name = form.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(invalid("Name must be 1-100 characters."));
    }

    let email = normalize_email(&form.email);
    if !is_plausible_email(&email) || email.chars().count() > MAX_EMAIL_CHARS {
        return Err(invalid("Please enter a valid email address."));
    }

    if form.password.len() < MIN_PASSWORD_LEN || form.password.len() > MAX_PASSWORD_LEN {
        return Err(invalid("Password must be 6-128 characters."));
    }

    Ok(NewAccount {
        name: name.to_string(),
        email,
    })
}

/// Login form fields.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returns the normalized email to look up.
pub fn validate_login_form(form: &LoginForm) -> Result<String, AppError> {
    let email = normalize_email(&form.email);
    if !is_plausible_email(&email) {
        return Err(AppError::validation(
            "Please enter a valid email address.",
            "/login",
        ));
    }
    if form.password.is_empty() {
        return Err(AppError::validation("Password must not be empty.", "/login"));
    }
    Ok(email)
}

/// Emails are compared and stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
