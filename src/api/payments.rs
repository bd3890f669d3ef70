use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
struct PaymentIntentRequest {
    price: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentResponse {
    client_secret: String,
}

impl ApiClient {
    /// Asks the backend to open a payment intent for `price` and returns its
    /// client secret.
    pub async fn create_payment_intent(&self, price: u32) -> Result<String, ApiError> {
        let res: PaymentIntentResponse = self.post("/payment/create-payment-intent", &PaymentIntentRequest { price }).await?;
        Ok(res.client_secret)
    }
}
