use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::{hash_password, verify_password, PasswordError, TokenError, TokenIssuer};
use crate::database::models::{tables, NewUser, User};
use crate::database::{from_rows, to_row, DataStore, Query, StoreError};
use crate::types::RowId;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Same message whether the user is unknown or the password is wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub admin: bool,
    pub id: RowId,
}

/// Signup and login against the `users` table.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DataStore>,
    tokens: Arc<TokenIssuer>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn DataStore>, tokens: Arc<TokenIssuer>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    /// Create a non-admin user and return a session token for it.
    ///
    /// Username uniqueness is left to the table service's own constraint.
    pub async fn signup(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let password_hash = self.hash(password).await?;
        let user = NewUser {
            username: username.to_string(),
            password: password_hash,
            admin: false,
        };

        self.store.insert(tables::USERS, vec![to_row(&user)?]).await?;
        info!("User '{}' signed up", username);

        Ok(self.tokens.issue(username)?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        // Lookup failures answer like an unknown user; the cause only goes to the log.
        let query = Query::all().eq("username", username).limit(1);
        let users: Vec<User> = match self.store.select(tables::USERS, &query).await.and_then(from_rows) {
            Ok(users) => users,
            Err(e) => {
                error!("User lookup for '{}' failed: {}", username, e);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let Some(user) = users.into_iter().next() else {
            warn!("Login rejected for '{}'", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify(password, &user.password).await? {
            warn!("Login rejected for '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.username)?;
        info!("User '{}' logged in", user.username);

        Ok(LoginOutcome {
            token,
            admin: user.admin,
            id: user.id,
        })
    }

    // bcrypt is deliberately slow; keep it off the async workers.
    async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))
    }
}
