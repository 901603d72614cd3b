//! Account creation and credential checks

use common::error::DatabaseError;
use tracing::{info, warn};

use crate::{
    error::AppError,
    models::{NewUser, User},
    password::PasswordService,
    repositories::UserStore,
};

/// Hash the password and persist a new account
pub async fn register(
    users: &dyn UserStore,
    passwords: &PasswordService,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let password_hash = passwords.hash(password).await?;

    let new_user = NewUser {
        username: username.to_string(),
        password_hash,
    };

    match users.create(&new_user).await {
        Ok(user) => {
            info!("Registered user {} ({})", user.username, user.id);
            Ok(user)
        }
        Err(DatabaseError::UniqueViolation(_)) => Err(AppError::UsernameTaken),
        Err(e) => Err(e.into()),
    }
}

/// Check a username and password
///
/// Returns `Ok(None)` for an unknown username or a wrong password; callers
/// cannot tell the two apart.
pub async fn authenticate(
    users: &dyn UserStore,
    passwords: &PasswordService,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = users.find_by_username(username).await? else {
        passwords.verify_dummy(password).await?;
        warn!("Login failed for {}: unknown username", username);
        return Ok(None);
    };

    if !passwords.verify(password, &user.password_hash).await? {
        warn!("Login failed for {}: incorrect password", username);
        return Ok(None);
    }

    Ok(Some(user))
}
