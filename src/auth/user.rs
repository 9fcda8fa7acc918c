use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use sqlx::SqliteConnection;
use sqlx::prelude::FromRow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Storage operation failed: {0}")]
    Storage(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateUsername,
            _ => StoreError::Storage(e),
        }
    }
}

/// Durable storage and point lookups for user records.
///
/// Implementations must reject a duplicate username atomically; callers never
/// check for existence before calling `create`.
#[async_trait]
pub trait CredentialStore: Send {
    /// Inserts a new record. The write is committed when this returns `Ok`.
    async fn create(&mut self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, StoreError>;
}

/// Credential store over a single borrowed SQLite connection.
pub struct SqliteCredentials<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteCredentials<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentials<'_> {
    async fn create(&mut self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES (?, ?)
            RETURNING id, username, password
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, username, password FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?;

        Ok(user)
    }
}

#[derive(Default)]
struct UserData {
    last_id: i64,
    users: HashMap<UserId, User>,
    username_to_id: HashMap<String, UserId>,
}

/// In-memory credential store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryCredentials {
    data: Arc<Mutex<UserData>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.data.lock().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn create(&mut self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut data = self.data.lock().await;

        if data.username_to_id.contains_key(username) {
            return Err(StoreError::DuplicateUsername);
        }

        data.last_id += 1;
        let user = User {
            id: UserId(data.last_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        data.username_to_id.insert(user.username.clone(), user.id);
        data.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .username_to_id
            .get(username)
            .and_then(|id| data.users.get(id))
            .cloned())
    }

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.data.lock().await.users.get(&id).cloned())
    }
}
