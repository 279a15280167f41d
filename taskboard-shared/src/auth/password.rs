/// Password hashing with Argon2id
///
/// Hashes are stored in PHC string format, so the parameters travel with the
/// hash and verification needs no configuration.
///
/// # Parameters
///
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Corr3ct-Horse")?;
///
/// assert!(verify_password("Corr3ct-Horse", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Error type for password operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
///
/// # Returns
///
/// PHC string, e.g. `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash
///
/// # Returns
///
/// `Ok(true)` on match, `Ok(false)` on mismatch
///
/// # Errors
///
/// `PasswordError::InvalidHash` if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks a new password against the registration policy
///
/// The password must be 8-128 characters and mix uppercase, lowercase,
/// digits and at least one symbol.
///
/// # Returns
///
/// `Err` with a message suitable for a field-level validation error
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
/// assert!(validate_password_strength("password").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LENGTH
        ));
    }

    let checks: [(fn(char) -> bool, &str); 4] = [
        (char::is_uppercase, "an uppercase letter"),
        (char::is_lowercase, "a lowercase letter"),
        (char::is_numeric, "a digit"),
        (|c: char| !c.is_alphanumeric(), "a special character"),
    ];

    for (predicate, requirement) in checks {
        if !password.chars().any(predicate) {
            return Err(format!("Password must contain {}", requirement));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("Test_passw0rd").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_hash_password_salts_differ() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        // Parses as a PHC string but carries no salt or hash to compare against
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Ok(false)
        ));
    }

    #[test]
    fn test_validate_password_strength() {
        for password in ["MyP@ssw0rd!", "Str0ng!Pass", "C0mpl3x#Pwd"] {
            assert!(validate_password_strength(password).is_ok(), "{password}");
        }

        let cases = [
            ("Sh0rt!", "at least 8"),
            ("lowercase1!", "uppercase"),
            ("UPPERCASE1!", "lowercase"),
            ("NoDigits!!", "digit"),
            ("NoSpecial123", "special character"),
        ];

        for (password, expected) in cases {
            let err = validate_password_strength(password).unwrap_err();
            assert!(err.contains(expected), "{password}: {err}");
        }
    }

    #[test]
    fn test_validate_password_strength_counts_characters() {
        // 8 characters, more than 8 bytes
        assert!(validate_password_strength("Äbcdéf1!").is_ok());

        let long = format!("Aa1!{}", "x".repeat(MAX_PASSWORD_LENGTH));
        assert!(validate_password_strength(&long)
            .unwrap_err()
            .contains("at most"));
    }
}
