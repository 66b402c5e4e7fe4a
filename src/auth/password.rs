use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

/// Hash a plaintext password with bcrypt and a fresh random salt.
///
/// The returned modular crypt string (`$2b$<cost>$...`) embeds the cost and
/// salt, so hashing the same input twice yields two different strings.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a plaintext password against a stored hash.
///
/// Never errors: a mismatch is `false`, and so is a stored value that is not
/// a bcrypt hash at all.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}
