use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored PHC hash.
///
/// Returns Ok(()) on match; the argon2 verifier is constant-time.
pub fn verify_password(password_hash: &str, password: &str) -> Result<(), anyhow::Error> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| anyhow::anyhow!("Password verification failed"))
}

/// Strength policy applied when a credential is first created: minimum
/// length plus upper-case, lower-case and digit character classes.
/// Existing credentials are never re-checked at login.
pub fn password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(strength_error("Password must be at least 6 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(strength_error(
            "Password must contain an upper-case letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(strength_error("Password must contain a lower-case letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(strength_error("Password must contain a digit"));
    }
    Ok(())
}

fn strength_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("password_strength");
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret1").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "Secret1").is_ok());
        assert!(verify_password(&hash, "Secret2").is_err());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = hash_password("Secret1").unwrap();
        let hash2 = hash_password("Secret1").unwrap();

        // Random salt: same password, different hashes.
        assert_ne!(hash1, hash2);
        assert!(verify_password(&hash1, "Secret1").is_ok());
        assert!(verify_password(&hash2, "Secret1").is_ok());
    }

    #[test]
    fn test_strength_boundary_length() {
        // Exactly the minimum length with all classes present.
        assert!(password_strength("Abc123").is_ok());
        // One short of the minimum, same composition.
        assert!(password_strength("Abc12").is_err());
    }

    #[test]
    fn test_strength_character_classes() {
        assert!(password_strength("abc123").is_err()); // no upper
        assert!(password_strength("ABC123").is_err()); // no lower
        assert!(password_strength("Abcdef").is_err()); // no digit
        assert!(password_strength("Abcde1").is_ok());
    }
}
