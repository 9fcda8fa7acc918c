pub mod authenticator;
mod layout;
pub mod signin;
pub mod signout;
pub mod signup;
pub mod user;

use serde::Deserialize;

pub use authenticator::SessionAuthenticator;
pub use authenticator::require_authentication;
pub use user::CredentialStore;
pub use user::User;
pub use user::UserId;

/// Fields posted by the register and login forms. Missing fields read as empty.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
