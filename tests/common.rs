#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scholarstream::api::{ApiClient, LocalStorage, MemoryStorage};
use scholarstream::auth::Session;
use scholarstream::checkout::{
    BillingDetails, CardInput, ClientSecret, PaymentError, PaymentIntent, PaymentIntentStatus, PaymentMethod,
    PaymentProvider,
};
use scholarstream::models::{Role, Scholarship};
use serde_json::json;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub fn storage_with_token() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::with_token(TOKEN))
}

pub fn client(server: &MockServer) -> ApiClient {
    client_with(server, storage_with_token())
}

pub fn client_with(server: &MockServer, storage: Arc<dyn LocalStorage>) -> ApiClient {
    ApiClient::new(&server.uri(), storage).expect("valid mock server uri")
}

pub fn session(email: &str, role: Role) -> Session {
    Session {
        uid: "uid-1".into(),
        email: Some(email.into()),
        display_name: None,
        photo_url: None,
        role,
        provider_token: Some("id-token".into()),
    }
}

pub fn scholarship(id: &str, fee: u32) -> Scholarship {
    serde_json::from_value(json!({
        "_id": id,
        "scholarshipName": "Global Excellence",
        "universityName": "Uni",
        "subjectCategory": "Engineering",
        "scholarshipCategory": "Full fund",
        "degree": "Masters",
        "applicationFees": fee,
        "serviceCharge": 10,
        "applicationDeadline": "2026-12-31"
    }))
    .expect("scholarship fixture")
}

pub fn application_json(id: &str, scholarship_id: &str, payment: &str, status: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "scholarshipId": scholarship_id,
        "scholarshipName": "Global Excellence",
        "universityName": "Uni",
        "userEmail": "a@x.com",
        "price": 50,
        "paymentStatus": payment,
        "status": status
    })
}

/// How the fake provider answers `confirm_card_payment`.
#[derive(Debug, Clone)]
pub enum Confirm {
    Succeeded(&'static str),
    Status(&'static str, PaymentIntentStatus),
    Declined(&'static str),
}

/// Scripted payment provider that records what it was asked to do.
pub struct FakePayments {
    method_error: Option<&'static str>,
    confirm: Confirm,
    pub calls: Mutex<Vec<&'static str>>,
    pub billing: Mutex<Option<BillingDetails>>,
}

impl FakePayments {
    pub fn new(confirm: Confirm) -> Self {
        Self { method_error: None, confirm, calls: Mutex::new(Vec::new()), billing: Mutex::new(None) }
    }

    pub fn failing_method(mut self, message: &'static str) -> Self {
        self.method_error = Some(message);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_payment_method(&self, _card: &CardInput) -> Result<PaymentMethod, PaymentError> {
        self.calls.lock().unwrap().push("create_payment_method");
        match self.method_error {
            Some(message) => Err(PaymentError::Declined { code: None, message: message.into() }),
            None => Ok(PaymentMethod { id: "pm_1".into() }),
        }
    }

    async fn confirm_card_payment(
        &self,
        _secret: &ClientSecret,
        _card: &CardInput,
        billing: &BillingDetails,
    ) -> Result<PaymentIntent, PaymentError> {
        self.calls.lock().unwrap().push("confirm_card_payment");
        *self.billing.lock().unwrap() = Some(billing.clone());
        match &self.confirm {
            Confirm::Succeeded(id) => {
                Ok(PaymentIntent { id: (*id).into(), status: PaymentIntentStatus::Succeeded, amount: Some(5000) })
            }
            Confirm::Status(id, status) => Ok(PaymentIntent { id: (*id).into(), status: *status, amount: None }),
            Confirm::Declined(message) => {
                Err(PaymentError::Declined { code: Some("card_declined".into()), message: (*message).into() })
            }
        }
    }
}
