use async_trait::async_trait;
use serde::Deserialize;

use super::payment::{
    BillingDetails, CardInput, ClientSecret, PaymentError, PaymentIntent, PaymentMethod, PaymentProvider,
};
use crate::config::PaymentCfg;

/// Stripe over its REST API with the publishable key, i.e. the same calls the
/// browser SDK makes. Card data only ever arrives as a widget token.
#[derive(Debug, Clone)]
pub struct StripeProvider {
    http: reqwest::Client,
    api_base: String,
    publishable_key: String,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    decline_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StripeProvider {
    pub fn new(api_base: &str, publishable_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            publishable_key: publishable_key.to_string(),
        }
    }

    pub fn from_config(cfg: &PaymentCfg) -> Result<Self, PaymentError> {
        let key = cfg.publishable_key.as_deref().ok_or(PaymentError::NotConfigured("payment.publishable_key"))?;
        Ok(Self::new(&cfg.api_base, key))
    }

    async fn post_form<T: serde::de::DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.api_base, path);
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.publishable_key)
            .form(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<StripeErrorEnvelope>(&text) {
                Ok(env) => (
                    env.error.decline_code.or(env.error.code),
                    env.error.message.unwrap_or_else(|| format!("payment failed ({status})")),
                ),
                Err(_) => (None, format!("payment failed ({status})")),
            };
            tracing::warn!(%status, %path, code = ?code, %message, "stripe rejected request");
            return Err(PaymentError::Declined { code, message });
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_payment_method(&self, card: &CardInput) -> Result<PaymentMethod, PaymentError> {
        self.post_form("/v1/payment_methods", &[("type", "card"), ("card[token]", card.token.as_str())]).await
    }

    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardInput,
        billing: &BillingDetails,
    ) -> Result<PaymentIntent, PaymentError> {
        let intent_id = secret.payment_intent_id().ok_or(PaymentError::InvalidSecret)?;

        let method: PaymentMethod = self
            .post_form(
                "/v1/payment_methods",
                &[
                    ("type", "card"),
                    ("card[token]", card.token.as_str()),
                    ("billing_details[email]", billing.email.as_str()),
                    ("billing_details[name]", billing.name.as_str()),
                ],
            )
            .await?;

        self.post_form(
            &format!("/v1/payment_intents/{}/confirm", intent_id),
            &[("client_secret", secret.expose()), ("payment_method", method.id.as_str())],
        )
        .await
    }
}
