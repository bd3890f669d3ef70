use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder billing value used when the session lacks an email or name.
pub const ANONYMOUS: &str = "anonymous";

/// Secret handed out by the backend for one payment intent. The intent id is
/// the part before `_secret_`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        self.0.split_once("_secret_").map(|(id, _)| id).filter(|id| !id.is_empty())
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Card as captured by the embedded card widget: a provider token, never a
/// raw card number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInput {
    pub token: String,
}

impl CardInput {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingDetails {
    pub email: String,
    pub name: String,
}

impl BillingDetails {
    pub fn from_parts(email: Option<&str>, name: Option<&str>) -> Self {
        let pick = |v: Option<&str>| v.filter(|s| !s.trim().is_empty()).unwrap_or(ANONYMOUS).to_string();
        Self { email: pick(email), name: pick(name) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresCapture,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub amount: Option<u64>,
}

impl PaymentIntent {
    pub fn succeeded(&self) -> bool {
        self.status == PaymentIntentStatus::Succeeded
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Card or request rejected by the provider; `message` is user-facing.
    #[error("{message}")]
    Declined { code: Option<String>, message: String },

    #[error("payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed client secret")]
    InvalidSecret,

    #[error("payment provider is not configured: {0}")]
    NotConfigured(&'static str),
}

/// Client-side half of the payment provider: tokenized card in, payment
/// method / confirmed intent out.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_payment_method(&self, card: &CardInput) -> Result<PaymentMethod, PaymentError>;

    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardInput,
        billing: &BillingDetails,
    ) -> Result<PaymentIntent, PaymentError>;
}
