use std::collections::HashMap;
use std::sync::LazyLock;
use std::sync::Mutex;
use tokio::task;
use tower_sessions::Session;

use super::user::CredentialStore;
use super::user::StoreError;
use super::user::User;
use super::user::UserId;
use crate::known_errors::AuthError;
use crate::known_errors::NotAuthenticated;

/// Session key holding the id of the logged in user.
pub const SESSION_USER_ID: &str = "userid";

/// Throwaway hashes, one per cost, checked against when the username is
/// unknown so that path costs the same as a wrong password.
static DUMMY_HASHES: LazyLock<Mutex<HashMap<u32, String>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Registration and login policy over a [`CredentialStore`].
///
/// Borrows the store for the duration of one request; the session is passed
/// to each operation that touches it.
pub struct SessionAuthenticator<'a, S: CredentialStore> {
    store: &'a mut S,
    bcrypt_cost: u32,
}

impl<'a, S: CredentialStore> SessionAuthenticator<'a, S> {
    pub fn new(store: &'a mut S, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Hashes the password and stores a new user.
    ///
    /// Every failure comes back as [`AuthError::RegistrationFailed`]; the
    /// cause is only logged.
    pub async fn register(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        let password_hash = hash_password(password, self.bcrypt_cost)
            .await
            .ok_or(AuthError::RegistrationFailed)?;

        match self.store.create(username, &password_hash).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "registered user {}", user.username);
                Ok(user)
            }
            Err(StoreError::DuplicateUsername) => {
                tracing::warn!("registration rejected, username {username:?} is taken");
                Err(AuthError::RegistrationFailed)
            }
            Err(e) => {
                tracing::error!("registration failed: {e}");
                Err(AuthError::RegistrationFailed)
            }
        }
    }

    /// Checks the credentials and, if they match, marks the session as
    /// belonging to the user.
    pub async fn login(
        &mut self,
        session: &Session,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = match self.store.find_by_username(username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.verify_against_dummy(password).await;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!("login lookup failed: {e}");
                self.verify_against_dummy(password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash).await {
            return Err(AuthError::InvalidCredentials);
        }

        // fresh id so a session fixed before login cannot ride along
        if let Err(e) = session.cycle_id().await {
            tracing::error!("failed to cycle session id: {e}");
            return Err(AuthError::InvalidCredentials);
        }
        if let Err(e) = session.insert(SESSION_USER_ID, user.id).await {
            tracing::error!("failed to store user id in session: {e}");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Burns one bcrypt verification at the configured cost.
    async fn verify_against_dummy(&self, password: &str) {
        if let Some(hash) = dummy_hash(self.bcrypt_cost).await {
            verify_password(password, &hash).await;
        }
    }

    pub async fn current_user(&mut self, session: &Session) -> Option<User> {
        current_user(session, &mut *self.store).await
    }

    pub async fn logout(&self, session: &Session) {
        logout(session).await
    }
}

/// Resolves the user recorded in the session.
///
/// An id with no matching record, or one that cannot be read, counts as no
/// user at all.
pub async fn current_user<S: CredentialStore>(session: &Session, store: &mut S) -> Option<User> {
    let user_id = match session.get::<UserId>(SESSION_USER_ID).await {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("unreadable session state: {e}");
            return None;
        }
    };

    match store.find_by_id(user_id).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            tracing::warn!(%user_id, "session refers to a missing user");
            None
        }
        Err(e) => {
            tracing::error!("failed to load session user: {e}");
            None
        }
    }
}

/// Forgets the logged in user. Calling it on an anonymous session is a no-op.
pub async fn logout(session: &Session) {
    if let Err(e) = session.remove_value(SESSION_USER_ID).await {
        tracing::warn!("failed to clear session user: {e}");
    }
}

/// Guard for pages that need a logged in user.
///
/// Call it first thing in a handler and `?` the result; the error renders as a
/// redirect to the login page.
pub async fn require_authentication<S: CredentialStore>(
    session: &Session,
    store: &mut S,
) -> Result<User, NotAuthenticated> {
    current_user(session, store).await.ok_or(NotAuthenticated)
}

/// The dummy hash for `cost`, computed on first use.
///
/// `main` calls this before serving so the first unknown-user login does not
/// pay for the hash as well.
pub async fn dummy_hash(cost: u32) -> Option<String> {
    if let Some(hash) = cached_dummy_hash(cost) {
        return Some(hash);
    }

    let hash = hash_password("gatekeep-dummy-password", cost).await?;
    match DUMMY_HASHES.lock() {
        Ok(mut hashes) => Some(hashes.entry(cost).or_insert(hash).clone()),
        Err(_) => Some(hash),
    }
}

fn cached_dummy_hash(cost: u32) -> Option<String> {
    DUMMY_HASHES
        .lock()
        .ok()
        .and_then(|hashes| hashes.get(&cost).cloned())
}

async fn hash_password(password: &str, cost: u32) -> Option<String> {
    let password = password.to_owned();
    match task::spawn_blocking(move || bcrypt::hash(password, cost)).await {
        Ok(Ok(hash)) => Some(hash),
        Ok(Err(e)) => {
            tracing::error!("password hashing failed: {e}");
            None
        }
        Err(e) => {
            tracing::error!("password hashing task failed: {e}");
            None
        }
    }
}

async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();
    match task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::error!("stored password hash is unusable: {e}");
            false
        }
        Err(e) => {
            tracing::error!("password verification task failed: {e}");
            false
        }
    }
}
