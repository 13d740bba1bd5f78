use super::errors::CredentialError;

/// Hash a plaintext password with bcrypt at the default cost.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Compare `plaintext` against a stored bcrypt `hash`.
///
/// An empty hash never matches. A non-empty hash that bcrypt cannot parse is
/// reported as [`CredentialError::Hash`]. CPU bound: call it off the async
/// executor.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, CredentialError> {
    if hash.is_empty() {
        return Ok(false);
    }
    Ok(bcrypt::verify(plaintext, hash)?)
}
