use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use thiserror::Error;

pub const LOGIN_URL: &str = "/login";

/// The only failures registration and login report to their callers.
///
/// Store and session errors are logged where they happen and collapsed into
/// one of these, so a caller cannot tell a taken username from a broken
/// database, or an unknown username from a wrong password. Handlers render
/// the message back into the form.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Failed to register user. Try another username.")]
    RegistrationFailed,
    #[error("Invalid login.")]
    InvalidCredentials,
}

/// Returned by the login guard when the session has no valid user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Not logged in")]
pub struct NotAuthenticated;

impl IntoResponse for NotAuthenticated {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_URL).into_response()
    }
}
