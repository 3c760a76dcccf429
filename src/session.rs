//! Session
//!
//! Mock sign-in. Any non-blank credentials are accepted; the resulting
//! [`UserMarker`] is kept under [`USER_KEY`] until sign-out.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{KeyValueStore, StorageError, USER_KEY, read_json, write_json};

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required form field was blank
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    /// The marker could not be stored or removed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What a signed-in user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Store administrator
    Admin,

    /// Regular shopper
    Customer,
}

/// Record of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMarker {
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name, set on sign-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Phone number, set on sign-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Role
    pub role: Role,
}

impl UserMarker {
    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Sign in with an email and password.
///
/// Emails containing "admin" sign in as [`Role::Admin`].
///
/// # Errors
///
/// Returns [`SessionError::MissingField`] if either value is blank, or a
/// storage error if the marker could not be saved.
pub fn sign_in(
    store: &dyn KeyValueStore,
    email: &str,
    password: &str,
) -> Result<UserMarker, SessionError> {
    let email = required("email", email)?;
    required("password", password)?;

    let role = if email.contains("admin") {
        Role::Admin
    } else {
        Role::Customer
    };

    let marker = UserMarker {
        email: Some(email.to_string()),
        name: None,
        phone: None,
        role,
    };

    write_json(store, USER_KEY, &marker)?;

    info!(?role, "signed in");

    Ok(marker)
}

/// Create an account and sign in as a customer.
///
/// # Errors
///
/// Returns [`SessionError::MissingField`] if the name, email or password is
/// blank, or a storage error if the marker could not be saved.
pub fn sign_up(
    store: &dyn KeyValueStore,
    name: &str,
    email: &str,
    password: &str,
    phone: Option<&str>,
) -> Result<UserMarker, SessionError> {
    let name = required("name", name)?;
    let email = required("email", email)?;
    required("password", password)?;

    let marker = UserMarker {
        email: Some(email.to_string()),
        name: Some(name.to_string()),
        phone: phone
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(ToString::to_string),
        role: Role::Customer,
    };

    write_json(store, USER_KEY, &marker)?;

    info!("signed up");

    Ok(marker)
}

/// The signed-in user, if any. A corrupt marker reads as signed out.
pub fn current_user(store: &dyn KeyValueStore) -> Option<UserMarker> {
    match read_json(store, USER_KEY) {
        Ok(marker) => marker,
        Err(err) => {
            warn!("failed to read user marker: {err}");

            None
        }
    }
}

/// Forget the signed-in user.
///
/// # Errors
///
/// Returns a storage error if the marker could not be removed.
pub fn sign_out(store: &dyn KeyValueStore) -> Result<(), SessionError> {
    store.remove(USER_KEY)?;

    info!("signed out");

    Ok(())
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, SessionError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(SessionError::MissingField(field));
    }

    Ok(value)
}
