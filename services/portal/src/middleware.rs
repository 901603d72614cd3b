//! Session middleware: turns the session cookie into the current user

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use tracing::debug;

use crate::{error::AppError, models::User, session::SessionId, state::AppState};

/// Name of the signed session cookie
pub const SESSION_COOKIE: &str = "portal.sid";

/// Who is making the request, inserted into request extensions
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    /// Session id from a correctly signed cookie, even if it no longer resolves
    pub session_id: Option<SessionId>,
    /// The logged-in user, if the session resolved to one
    pub user: Option<User>,
}

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Resolve the session cookie into a [`CurrentUser`] for every request
pub async fn session_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = resolve_current_user(&state, &cookies).await?;
    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

async fn resolve_current_user(
    state: &AppState,
    cookies: &Cookies,
) -> Result<CurrentUser, AppError> {
    let Some(cookie) = cookies.signed(&state.cookie_key).get(SESSION_COOKIE) else {
        return Ok(CurrentUser::default());
    };

    let session_id = SessionId::from(cookie.value());

    let user = match state.sessions.resolve(&session_id).await? {
        Some(user_id) => {
            let user = state.users.find_by_id(user_id).await?;
            if user.is_none() {
                debug!("Session refers to missing user {}", user_id);
            }
            user
        }
        None => None,
    };

    Ok(CurrentUser {
        session_id: Some(session_id),
        user,
    })
}

/// Build the cookie carrying a freshly created session id
///
/// `secure` restricts the cookie to HTTPS; enable it when served behind TLS.
pub fn session_cookie(session_id: &SessionId, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.as_str().to_string());
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// Cookie used to clear the session cookie on the client
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&SessionId::from("abc"), false);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_session_cookie_secure_flag() {
        let cookie = session_cookie(&SessionId::from("abc"), true);
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_anonymous_by_default() {
        let current = CurrentUser::default();
        assert!(current.user().is_none());
        assert!(current.session_id.is_none());
    }
}
