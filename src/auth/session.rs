//! Signed-cookie sessions
//!
//! The session is an opaque binding from a browser cookie to a user id. The
//! cookie value is the user id signed with the configured secret key, so a
//! tampered or unsigned cookie reads as "no session". Expiry and transport
//! are the cookie layer's concern.

use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::db::UserId;

pub const SESSION_COOKIE: &str = "session";

/// Mark the caller as authenticated for subsequent requests.
pub fn start(jar: SignedCookieJar, user_id: UserId) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Read the caller's current session, if any.
pub fn current(jar: &SignedCookieJar) -> Option<UserId> {
    jar.get(SESSION_COOKIE)?.value().parse::<UserId>().ok()
}

/// Invalidate the current session immediately.
pub fn end(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    #[test]
    fn test_start_then_current() {
        let jar = SignedCookieJar::new(Key::generate());
        assert_eq!(current(&jar), None);

        let jar = start(jar, 42);
        assert_eq!(current(&jar), Some(42));
    }

    #[test]
    fn test_end_clears_session() {
        let jar = start(SignedCookieJar::new(Key::generate()), 7);
        let jar = end(jar);
        assert_eq!(current(&jar), None);
    }

    #[test]
    fn test_non_numeric_cookie_reads_as_no_session() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = jar.add(Cookie::new(SESSION_COOKIE, "not-a-user-id"));
        assert_eq!(current(&jar), None);
    }
}
