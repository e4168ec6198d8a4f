use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiz_core::{AuthError, AuthSession, AuthUser, IdentityProvider};

use crate::StoreError;

/// REST client for the hosted authentication service.
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityToolkitClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn call<B: Serialize + Sync, R: DeserializeOwned>(&self, method: &str, body: &B) -> Result<R, AuthError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            return response
                .json::<R>()
                .await
                .map_err(|e| AuthError::Unavailable(e.to_string()));
        }

        let status = response.status();
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => {
                tracing::warn!("Identity call {} rejected: {}", method, envelope.error.message);
                Err(AuthError::from_code(&envelope.error.message))
            }
            Err(_) => Err(AuthError::Unavailable(format!("identity service returned {}", status))),
        }
    }

    fn into_session(account: AccountResponse) -> Result<AuthSession, AuthError> {
        let id_token = account
            .id_token
            .ok_or_else(|| AuthError::Unavailable("identity service returned no token".to_string()))?;
        Ok(AuthSession {
            user: AuthUser {
                uid: account.local_id,
                email: account.email,
                display_name: account.display_name.filter(|n| !n.is_empty()),
            },
            id_token,
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        Self::into_session(self.call("signUp", &body).await?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        Self::into_session(self.call("signInWithPassword", &body).await?)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = OobRequest { request_type: "PASSWORD_RESET", email };
        let _: serde_json::Value = self.call("sendOobCode", &body).await?;
        Ok(())
    }

    async fn update_profile(&self, id_token: &str, display_name: &str) -> Result<AuthUser, AuthError> {
        let body = UpdateRequest { id_token, display_name, return_secure_token: true };
        let account: AccountResponse = self.call("update", &body).await?;
        Ok(AuthUser {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_maps_to_taxonomy() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(AuthError::from_code(&envelope.error.message), AuthError::EmailInUse);
    }

    #[test]
    fn test_account_response_becomes_session() {
        let body = r#"{"localId":"abc123","email":"ama@example.com","idToken":"tok","displayName":""}"#;
        let account: AccountResponse = serde_json::from_str(body).unwrap();
        let session = IdentityToolkitClient::into_session(account).unwrap();
        assert_eq!(session.user.uid, "abc123");
        assert_eq!(session.user.display_name, None);
        assert_eq!(session.id_token, "tok");
    }
}
