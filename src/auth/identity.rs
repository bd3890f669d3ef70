use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::IdentityCfg;

/// What the identity provider knows about a signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn update_profile(&self, id_token: &str, update: &ProfileUpdate) -> Result<Identity, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Stand-in used when no identity provider is configured. Stored sessions
/// still load and sign-out still works; signing in does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
        Err(AuthError::NotConfigured("identity.api_key"))
    }

    async fn update_profile(&self, _id_token: &str, _update: &ProfileUpdate) -> Result<Identity, AuthError> {
        Err(AuthError::NotConfigured("identity.api_key"))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Email/password accounts on the Firebase Identity Toolkit REST API.
#[derive(Debug, Clone)]
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
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

impl FirebaseIdentityProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(cfg: &IdentityCfg) -> Result<Self, AuthError> {
        let key = cfg.api_key.as_deref().ok_or(AuthError::NotConfigured("identity.api_key"))?;
        Ok(Self::new(&cfg.base_url, key))
    }

    async fn call<B: Serialize>(&self, op: &str, body: &B) -> Result<AccountResponse, AuthError> {
        let url = format!("{}/v1/accounts:{}", self.base_url, op);
        let res = self.http.post(&url).query(&[("key", self.api_key.as_str())]).json(body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!(%status, %op, %message, "identity provider rejected request");
            return Err(AuthError::Provider { status: status.as_u16(), message });
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let body = SignInRequest { email, password, return_secure_token: true };
        let account = self.call("signInWithPassword", &body).await?;
        let id_token = account.id_token.clone().unwrap_or_default();
        Ok(Identity {
            uid: account.local_id,
            email: account.email.or_else(|| Some(email.to_string())),
            display_name: account.display_name.filter(|n| !n.is_empty()),
            photo_url: account.photo_url.filter(|p| !p.is_empty()),
            id_token,
        })
    }

    async fn update_profile(&self, id_token: &str, update: &ProfileUpdate) -> Result<Identity, AuthError> {
        let body = UpdateRequest {
            id_token,
            display_name: update.display_name.as_deref(),
            photo_url: update.photo_url.as_deref(),
            return_secure_token: true,
        };
        let account = self.call("update", &body).await?;
        Ok(Identity {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|n| !n.is_empty()),
            photo_url: account.photo_url.filter(|p| !p.is_empty()),
            // update only hands out a fresh token when the old one was rotated
            id_token: account.id_token.unwrap_or_else(|| id_token.to_string()),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // id tokens are bearer-only; dropping them locally is the sign-out
        Ok(())
    }
}
