/// JWT access and refresh tokens
///
/// Tokens are HS256-signed and carry the user id as subject. Access tokens
/// authenticate API calls; refresh tokens can only be exchanged for a new
/// access token.
///
/// # Lifetimes
///
/// - **Access Token**: 24 hours
/// - **Refresh Token**: 30 days
///
/// The signing secret should be at least 32 bytes; the API refuses to start
/// with a shorter one.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{issue_token_pair, validate_access_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "an-example-secret-of-at-least-32-bytes";
/// let user_id = Uuid::new_v4();
///
/// let pair = issue_token_pair(user_id, secret)?;
/// let claims = validate_access_token(&pair.access_token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `iss` claim on every token we issue
pub const TOKEN_ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    /// An access token was presented where a refresh token is required, or
    /// the other way round
    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Default lifetime for this token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
///
/// `sub` is the user id; `token_type` is our only custom claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims with the default lifetime of `token_type`
    pub fn new(user_id: Uuid, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Creates claims expiring `expires_in` from now
    ///
    /// A negative duration yields an already expired token, which is handy in
    /// tests.
    pub fn with_expiration(user_id: Uuid, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds until expiry, or None once expired
    pub fn expires_in_seconds(&self) -> Option<i64> {
        let remaining = self.exp - Utc::now().timestamp();
        (remaining > 0).then_some(remaining)
    }
}

/// An access token with its matching refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Signs `claims` with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Issues a fresh access/refresh token pair for a user
pub fn issue_token_pair(user_id: Uuid, secret: &str) -> Result<TokenPair, JwtError> {
    let access = Claims::new(user_id, TokenType::Access);
    let refresh = Claims::new(user_id, TokenType::Refresh);

    Ok(TokenPair {
        access_token: create_token(&access, secret)?,
        refresh_token: create_token(&refresh, secret)?,
        expires_in: TokenType::Access.default_expiration().num_seconds(),
    })
}

/// Validates signature, expiry, not-before and issuer, and returns the claims
///
/// # Errors
///
/// - `JwtError::Expired` if the token has expired
/// - `JwtError::ValidationError` for any other failure (bad signature,
///   foreign issuer, malformed token)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::ValidationError(e.to_string()),
        })
}

fn validate_token_of_type(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }

    Ok(claims)
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_of_type(token, secret, TokenType::Access)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_of_type(token, secret, TokenType::Refresh)
}

/// Exchanges a valid refresh token for a new access token for the same user
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh_claims = validate_refresh_token(refresh_token, secret)?;
    create_token(&Claims::new(refresh_claims.sub, TokenType::Access), secret)
}
