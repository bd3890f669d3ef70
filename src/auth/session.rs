use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::identity::{Identity, IdentityProvider, ProfileUpdate};
use super::AuthError;
use crate::api::{ApiClient, SESSION_KEY};
use crate::models::Role;

/// The signed-in user as seen by every view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_token: Option<String>,
}

impl Session {
    pub fn from_identity(identity: Identity, role: Role) -> Self {
        Session {
            uid: identity.uid,
            email: identity.email,
            display_name: identity.display_name,
            photo_url: identity.photo_url,
            role,
            provider_token: Some(identity.id_token).filter(|t| !t.is_empty()),
        }
    }
}

/// Role used for gating; signed-out visitors and records without a role are students.
pub fn role_of(session: Option<&Session>) -> Role {
    session.map(|s| s.role).unwrap_or_default()
}

pub fn with_profile(session: &Session, display_name: Option<&str>, photo_url: Option<&str>) -> Session {
    Session {
        display_name: display_name.map(str::to_string).or_else(|| session.display_name.clone()),
        photo_url: photo_url.map(str::to_string).or_else(|| session.photo_url.clone()),
        ..session.clone()
    }
}

/// Authentication state handed to each component explicitly. Sign-in state
/// survives between runs through local storage next to the bearer token.
pub struct SessionContext {
    api: ApiClient,
    identity: Arc<dyn IdentityProvider>,
    current: Option<Session>,
}

impl SessionContext {
    pub fn new(api: ApiClient, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { api, identity, current: None }
    }

    /// Picks up a previously persisted session. A corrupt entry is dropped.
    pub fn restore(api: ApiClient, identity: Arc<dyn IdentityProvider>) -> Result<Self, AuthError> {
        let current = match api.storage().get(SESSION_KEY)? {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(error = ?e, "discarding unreadable stored session");
                    api.storage().remove(SESSION_KEY)?;
                    None
                }
            },
            None => None,
        };
        Ok(Self { api, identity, current })
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn role(&self) -> Role {
        role_of(self.current.as_ref())
    }

    pub fn require(&self) -> Result<&Session, AuthError> {
        self.current.as_ref().ok_or(AuthError::NotSignedIn)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, AuthError> {
        let identity = self.identity.sign_in(email, password).await?;
        let token = self.api.issue_token(email).await?;
        self.api.store_token(&token)?;

        let role = match self.api.user(email).await {
            Ok(user) => user.role,
            Err(e) if e.is_not_found() => {
                tracing::warn!(%email, "no user record on the server, treating as student");
                Role::Student
            }
            Err(e) => {
                // no session, so no token
                if let Err(clear) = self.api.clear_token() {
                    tracing::warn!(error = %clear, "could not drop token after failed login");
                }
                return Err(e.into());
            }
        };

        let session = Session::from_identity(identity, role);
        tracing::info!(uid = %session.uid, role = %session.role, "signed in");
        self.persist(session)
    }

    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.identity.sign_out().await?;
        self.api.clear_token()?;
        self.api.storage().remove(SESSION_KEY)?;
        if let Some(s) = self.current.take() {
            tracing::info!(uid = %s.uid, "signed out");
        }
        Ok(())
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<&Session, AuthError> {
        let current = self.require()?.clone();
        let token = current.provider_token.clone().ok_or(AuthError::NotSignedIn)?;
        let identity = self.identity.update_profile(&token, &update).await?;

        let mut next = with_profile(&current, identity.display_name.as_deref(), identity.photo_url.as_deref());
        next.provider_token = Some(identity.id_token).filter(|t| !t.is_empty()).or(current.provider_token);
        self.persist(next)
    }

    fn persist(&mut self, session: Session) -> Result<&Session, AuthError> {
        let raw = serde_json::to_string(&session).map_err(crate::error::ApiError::from)?;
        self.api.storage().set(SESSION_KEY, &raw)?;
        Ok(self.current.insert(session))
    }
}
