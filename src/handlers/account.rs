//! Account route handlers
//!
//! Registration, login, logout, and the profile page. Successful
//! registration or login starts a session and redirects to the profile;
//! failures re-render the form with a message.

use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use log::info;
use serde::Deserialize;

use crate::auth::{credentials, session};
use crate::error::AuthError;
use crate::handlers::{internal_error, pages};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// GET / - land on the profile when logged in, otherwise the login form.
pub async fn index(jar: SignedCookieJar) -> Redirect {
    if session::current(&jar).is_some() {
        Redirect::to("/profile")
    } else {
        Redirect::to("/login")
    }
}

/// GET /register
pub async fn register_form() -> Html<String> {
    pages::register_page(None)
}

/// POST /register
pub async fn register_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match credentials::register(&state.db, &form.username, &form.password) {
        Ok(user_id) => (session::start(jar, user_id), Redirect::to("/profile")).into_response(),
        Err(AuthError::InvalidInput(_)) => {
            pages::register_page(Some("Username and password are required.")).into_response()
        }
        Err(AuthError::UsernameTaken(_)) => {
            pages::register_page(Some("Username already exists.")).into_response()
        }
        Err(e) => internal_error("registration failed", &e),
    }
}

/// GET /login
pub async fn login_form() -> Html<String> {
    pages::login_page(None)
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match credentials::verify(&state.db, &form.username, &form.password) {
        Ok(Some(user_id)) => {
            info!("User {} logged in", user_id);
            (session::start(jar, user_id), Redirect::to("/profile")).into_response()
        }
        // Unknown user and wrong password answer identically
        Ok(None) => pages::login_page(Some("Invalid credentials")).into_response(),
        Err(e) => internal_error("login failed", &e),
    }
}

/// GET /logout
pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    (session::end(jar), Redirect::to("/login"))
}

/// GET /profile
pub async fn profile(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    // 1. Authentication check
    let Some(user_id) = session::current(&jar) else {
        return Redirect::to("/login").into_response();
    };

    // 2. Resolve the account; a session for a vanished user is logged out
    match state.db.user_by_id(user_id) {
        Ok(Some(user)) => pages::profile_page(&user.username).into_response(),
        Ok(None) => (session::end(jar), Redirect::to("/login")).into_response(),
        Err(e) => internal_error("profile lookup failed", &e),
    }
}
