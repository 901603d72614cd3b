//! Portal routes

use std::net::SocketAddr;
use std::path::Path;

use axum::{
    Extension, Form, Json, Router,
    extract::{ConnectInfo, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
    auth,
    error::AppError,
    middleware::{CurrentUser, removal_cookie, session_cookie, session_middleware},
    models::{LoginForm, SignupForm},
    state::AppState,
    templates,
    validation::validate_signup,
};

/// Create the router for the portal
///
/// Unmatched paths fall through to static files under `static_dir`; those
/// skip session resolution.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/verify", get(verify))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route("/health", get(health_check))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.users.health_check().await;
    let session_store = state.sessions.health_check().await;

    let (status, label) = if database && session_store {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(serde_json::json!({
            "status": label,
            "service": "portal",
            "database": database,
            "session_store": session_store,
        })),
    )
}

/// Home page
pub async fn index(Extension(current): Extension<CurrentUser>) -> Html<String> {
    Html(templates::index_page(current.user()))
}

/// Signup form
pub async fn signup_page(Extension(current): Extension<CurrentUser>) -> Html<String> {
    Html(templates::signup_page(current.user(), None))
}

/// Account creation
pub async fn signup(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if let Err(message) = validate_signup(&form.username, &form.password) {
        let page = templates::signup_page(current.user(), Some(&message));
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    auth::register(
        state.users.as_ref(),
        &state.passwords,
        &form.username,
        &form.password,
    )
    .await?;

    Ok(Redirect::to("/").into_response())
}

/// Login form
pub async fn login_page(Extension(current): Extension<CurrentUser>) -> Html<String> {
    Html(templates::login_page(current.user()))
}

/// Key for the login limiter: guesses are counted per client and account
fn throttle_key(client: &SocketAddr, username: &str) -> String {
    format!("{}/{}", client.ip(), username)
}

/// Credential check; success starts a new session
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    cookies: Cookies,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let limiter_key = throttle_key(&client, &form.username);
    if !state.login_limiter.try_attempt(&limiter_key).await {
        return Err(AppError::TooManyAttempts);
    }

    let user = auth::authenticate(
        state.users.as_ref(),
        &state.passwords,
        &form.username,
        &form.password,
    )
    .await?;

    let Some(user) = user else {
        return Ok(Redirect::to("/login"));
    };

    state.login_limiter.reset(&limiter_key).await;

    // Never reuse a session id that existed before authentication.
    if let Some(previous) = &current.session_id {
        state.sessions.destroy_session(previous).await?;
    }

    let session_id = state.sessions.create_session(user.id).await?;
    cookies
        .signed(&state.cookie_key)
        .add(session_cookie(&session_id, state.cookie_secure));

    info!("User {} logged in", user.username);
    Ok(Redirect::to("/"))
}

/// Session teardown
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(current): Extension<CurrentUser>,
) -> Result<Redirect, AppError> {
    if let Some(session_id) = &current.session_id {
        state.sessions.destroy_session(session_id).await?;
        cookies.signed(&state.cookie_key).remove(removal_cookie());
    }

    if let Some(user) = current.user() {
        info!("User {} logged out", user.username);
    }

    Ok(Redirect::to("/"))
}

/// Members-only page; anonymous visitors are sent to the login form
pub async fn verify(Extension(current): Extension<CurrentUser>) -> Response {
    match current.user() {
        Some(user) => Html(templates::verify_page(user)).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}
