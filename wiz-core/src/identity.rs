use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Guest,
    Operator,
    Admin,
}

impl Role {
    /// Operators and admins may open the admin console.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Operator | Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "Guest",
            Role::Operator => "Operator",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Guest" => Some(Role::Guest),
            "Operator" => Some(Role::Operator),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The user the hosted auth service vouches for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Result of a successful sign-up or sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    /// Provider token, needed for profile updates.
    pub id_token: String,
}

/// Profile document stored in the `users` collection, keyed by uid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: &AuthUser, display_name: &str, role: Role) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: display_name.to_string(),
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Error taxonomy of the hosted auth service. Every variant renders as a
/// message that can be shown to the guest next to the form.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password. Please check your credentials.")]
    InvalidCredential,
    #[error("An account with this email already exists.")]
    EmailInUse,
    #[error("Password should be at least 6 characters.")]
    WeakPassword,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,
    #[error("Authentication failed. Please try again shortly.")]
    Unavailable(String),
}

impl AuthError {
    /// Maps provider error codes, both the SDK style (`auth/email-already-in-use`)
    /// and the REST style (`EMAIL_EXISTS`), onto the taxonomy.
    pub fn from_code(code: &str) -> Self {
        let code = code.split(':').next().unwrap_or(code).trim();
        match code {
            "auth/invalid-credential"
            | "auth/wrong-password"
            | "auth/user-not-found"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_PASSWORD"
            | "EMAIL_NOT_FOUND"
            | "USER_DISABLED"
            | "INVALID_ID_TOKEN" => AuthError::InvalidCredential,
            "auth/email-already-in-use" | "auth/email-already-exists" | "EMAIL_EXISTS" => {
                AuthError::EmailInUse
            }
            "auth/weak-password" | "WEAK_PASSWORD" => AuthError::WeakPassword,
            "auth/invalid-email" | "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "permission-denied" | "auth/operation-not-allowed" | "PERMISSION_DENIED"
            | "OPERATION_NOT_ALLOWED" => AuthError::PermissionDenied,
            other => AuthError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn update_profile(&self, id_token: &str, display_name: &str) -> Result<AuthUser, AuthError>;
}

struct MockAccount {
    user: AuthUser,
    password: String,
}

/// In-process identity provider used by tests and local development.
#[derive(Default)]
pub struct MockIdentityProvider {
    accounts: Mutex<HashMap<String, MockAccount>>,
    resets: Mutex<Vec<String>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails a password reset was requested for, oldest first.
    pub async fn reset_requests(&self) -> Vec<String> {
        self.resets.lock().await.clone()
    }

    fn token_for(uid: &str) -> String {
        format!("mock-token-{}", uid)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&email) {
            return Err(AuthError::EmailInUse);
        }

        let user = AuthUser {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.clone(),
            display_name: None,
        };
        accounts.insert(email, MockAccount { user: user.clone(), password: password.to_string() });
        tracing::info!("Mock identity registered uid {}", user.uid);

        Ok(AuthSession { id_token: Self::token_for(&user.uid), user })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim().to_lowercase();
        let accounts = self.accounts.lock().await;
        match accounts.get(&email) {
            Some(account) if account.password == password => Ok(AuthSession {
                id_token: Self::token_for(&account.user.uid),
                user: account.user.clone(),
            }),
            _ => Err(AuthError::InvalidCredential),
        }
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        if !self.accounts.lock().await.contains_key(&email) {
            return Err(AuthError::InvalidCredential);
        }
        self.resets.lock().await.push(email);
        Ok(())
    }

    async fn update_profile(&self, id_token: &str, display_name: &str) -> Result<AuthUser, AuthError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .values_mut()
            .find(|a| Self::token_for(&a.user.uid) == id_token)
            .ok_or(AuthError::InvalidCredential)?;
        account.user.display_name = Some(display_name.to_string());
        Ok(account.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_taxonomy() {
        assert_eq!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailInUse);
        assert_eq!(AuthError::from_code("auth/invalid-credential"), AuthError::InvalidCredential);
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(AuthError::from_code("INVALID_EMAIL"), AuthError::InvalidEmail);
        assert_eq!(AuthError::from_code("PERMISSION_DENIED"), AuthError::PermissionDenied);
        assert!(matches!(AuthError::from_code("QUOTA_EXCEEDED"), AuthError::Unavailable(_)));
    }

    #[test]
    fn test_privileged_roles() {
        assert!(Role::Operator.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!(!Role::Guest.is_privileged());
    }

    #[tokio::test]
    async fn test_mock_provider_sign_up_and_sign_in() {
        let provider = MockIdentityProvider::new();

        let session = provider.sign_up("Guest@Example.com", "secret1").await.unwrap();
        assert_eq!(session.user.email, "guest@example.com");

        let again = provider.sign_up("guest@example.com", "secret1").await;
        assert_eq!(again.unwrap_err(), AuthError::EmailInUse);

        let signed_in = provider.sign_in("guest@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.user.uid, session.user.uid);

        let wrong = provider.sign_in("guest@example.com", "nope").await;
        assert_eq!(wrong.unwrap_err(), AuthError::InvalidCredential);

        let weak = provider.sign_up("other@example.com", "123").await;
        assert_eq!(weak.unwrap_err(), AuthError::WeakPassword);
    }

    #[tokio::test]
    async fn test_mock_provider_profile_update_and_reset() {
        let provider = MockIdentityProvider::new();
        let session = provider.sign_up("ama@example.com", "secret1").await.unwrap();

        let user = provider.update_profile(&session.id_token, "Ama Mensah").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ama Mensah"));

        provider.send_password_reset("ama@example.com").await.unwrap();
        assert_eq!(provider.reset_requests().await, vec!["ama@example.com".to_string()]);
    }
}
