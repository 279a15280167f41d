/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength checks
/// - [`jwt`]: Access and refresh token issuing and validation
/// - [`middleware`]: Bearer-token middleware producing an `AuthContext`
/// - [`hierarchy`]: Chief chains over a project's employees
/// - [`authorization`]: Project-scoped permission rules
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::issue_token_pair;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Us3r-password")?;
/// assert!(verify_password("Us3r-password", &hash)?);
///
/// let tokens = issue_token_pair(Uuid::new_v4(), "an-example-secret-of-at-least-32-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod hierarchy;
pub mod jwt;
pub mod middleware;
pub mod password;
