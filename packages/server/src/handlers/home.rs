use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;

use crate::extractors::auth::AuthUser;
use crate::flash;
use crate::views;

/// Landing page.
pub async fn home(user: Option<AuthUser>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    (jar, views::home(user.as_ref(), &flashes))
}
