use argon2::Argon2;
use rand::Rng;

use crate::error::AppError;

const HASH_LEN: usize = 32;

/// Generate a random per-user salt.
pub fn generate_salt() -> [u8; HASH_LEN] {
    rand::thread_rng().gen()
}

/// Hash a password with Argon2id using the provided salt.
pub fn hash_password(password: &str, salt: &[u8]) -> Result<[u8; HASH_LEN], AppError> {
    let argon2 = Argon2::default();
    let mut hash = [0u8; HASH_LEN];

    argon2
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))?;

    Ok(hash)
}

/// Hash a password with a fresh salt, returning `(hash, salt)` as base64
/// strings ready for the JSON store.
pub fn hash_for_storage(password: &str) -> Result<(String, String), AppError> {
    let salt = generate_salt();
    let hash = hash_password(password, &salt)?;
    Ok((
        base64_simd::STANDARD.encode_to_string(hash),
        base64_simd::STANDARD.encode_to_string(salt),
    ))
}

/// Verify a password against stored base64 hash and salt.
pub fn verify_password(password: &str, stored_hash: &str, stored_salt: &str) -> Result<bool, AppError> {
    let salt = base64_simd::STANDARD
        .decode_to_vec(stored_salt)
        .map_err(|e| AppError::Crypto(format!("Invalid stored salt: {}", e)))?;
    let expected = base64_simd::STANDARD
        .decode_to_vec(stored_hash)
        .map_err(|e| AppError::Crypto(format!("Invalid stored hash: {}", e)))?;

    let computed = hash_password(password, &salt)?;
    Ok(computed.as_slice() == expected.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify() {
        let password = "test_password_123";
        let (hash, salt) = hash_for_storage(password).unwrap();

        assert!(verify_password(password, &hash, &salt).unwrap());
        assert!(!verify_password("wrong_password", &hash, &salt).unwrap());
    }

    #[test]
    fn fresh_salts_differ() {
        let (hash_a, salt_a) = hash_for_storage("secret1").unwrap();
        let (hash_b, salt_b) = hash_for_storage("secret1").unwrap();
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }
}
