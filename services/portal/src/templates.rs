//! HTML templates for the portal
//!
//! Simple inline HTML templates without a template engine. Every value
//! that comes from a user goes through [`html_escape`].

use axum::http::StatusCode;

use crate::models::User;

fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<span class="whoami">Signed in as <strong>{}</strong></span>
            <a href="/verify">Verify</a>
            <a href="/logout">Log out</a>"#,
            html_escape(&user.username)
        ),
        None => r#"<a href="/login">Log in</a>
            <a href="/signup">Sign up</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Portal - {title}</title>
    <link rel="stylesheet" href="/styles.css">
</head>
<body>
    <nav>
        <a href="/">Home</a>
        {nav}
    </nav>
    <div class="container">
        {body}
    </div>
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Render the home page
pub fn index_page(user: Option<&User>) -> String {
    let body = match user {
        Some(user) => format!(
            r#"<h1>Welcome back, {}</h1>
        <p>You are logged in.</p>"#,
            html_escape(&user.username)
        ),
        None => r#"<h1>Welcome</h1>
        <p>Please <a href="/login">log in</a> or <a href="/signup">create an account</a>.</p>"#
            .to_string(),
    };

    layout("Home", user, &body)
}

/// Render the signup form, with an optional error message
pub fn signup_page(user: Option<&User>, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
        {error}
        <form method="POST" action="/signup">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" autocomplete="username" required>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" autocomplete="new-password" required>
            </div>
            <button type="submit">Sign up</button>
        </form>"#,
        error = error_banner(error),
    );

    layout("Sign up", user, &body)
}

/// Render the login form
pub fn login_page(user: Option<&User>) -> String {
    let body = r#"<h1>Log in</h1>
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" autocomplete="username" required>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" autocomplete="current-password" required>
            </div>
            <button type="submit">Log in</button>
        </form>"#;

    layout("Log in", user, body)
}

/// Render the members-only page
pub fn verify_page(user: &User) -> String {
    let body = format!(
        r#"<h1>Verified</h1>
        <div class="info-row"><span class="label">Username:</span> <span class="value">{}</span></div>
        <div class="info-row"><span class="label">Member since:</span> <span class="value">{}</span></div>"#,
        html_escape(&user.username),
        user.created_at.format("%Y-%m-%d"),
    );

    layout("Verified", Some(user), &body)
}

/// Render an error page
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{} {}</h1>
        {}
        <p><a href="/">Back to home</a></p>"#,
        status.as_u16(),
        html_escape(title),
        error_banner(Some(message)),
    );

    layout(title, None, &body)
}

fn error_banner(error: Option<&str>) -> String {
    error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    })
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
