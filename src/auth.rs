//! Credential hashing for the handshake

use crate::{Error, Result};

/// Derive the user password hash sent during the handshake.
///
/// Only the empty-password case is supported and yields an empty hash. Real
/// password hashing is not implemented: a non-empty password is rejected with
/// [`Error::Unsupported`] rather than approximated, since a wrong hash would
/// fail server-side with a far less useful diagnostic.
pub fn hash_password(user: &str, password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Ok(Vec::new());
    }
    Err(Error::Unsupported(format!(
        "password hashing for user {:?} is not implemented; only an empty password is accepted",
        user
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credentials_hash_to_empty_bytes() {
        assert_eq!(hash_password("", "").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_empty_password_with_user_hashes_to_empty_bytes() {
        assert_eq!(hash_password("SA", "").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_nonempty_password_is_rejected() {
        assert!(matches!(
            hash_password("SA", "secret"),
            Err(Error::Unsupported(_))
        ));
    }
}
