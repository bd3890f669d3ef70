//! Payment-gated application flow.
//!
//! One [`CheckoutWorkflow`] drives one scholarship application:
//!
//! 1. `mount` opens a payment intent when the scholarship charges a fee.
//! 2. `submit` creates a payment method from the card widget, confirms the
//!    charge, then writes the application record:
//!    - declined: an `unpaid`/`pending` record and the failure route;
//!    - charged: the user's unpaid record for this scholarship is marked paid,
//!      an already-paid one is reused, otherwise a `paid`/`pending` record is
//!      inserted, and the success route carries the receipt.
//!
//! A charge that goes through but cannot be recorded is reported as
//! [`CheckoutOutcome::RecordKeepingFailed`]; there is no refund or retry.

pub mod payment;
pub mod stripe;

pub use payment::{
    BillingDetails, CardInput, ClientSecret, PaymentError, PaymentIntent, PaymentIntentStatus, PaymentMethod,
    PaymentProvider, ANONYMOUS,
};
pub use stripe::StripeProvider;

use chrono::Utc;

use crate::api::ApiClient;
use crate::auth::Session;
use crate::error::ApiError;
use crate::models::{Application, ApplicationStatus, NewApplication, PaymentStatus, PaymentUpdate, Scholarship};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Stay on the checkout screen and show the outcome inline.
    Stay,
    PaymentSuccess,
    PaymentFailed,
}

/// How the application record was brought to its paid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Inserted,
    MarkedPaid,
    AlreadyPaid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessView {
    pub transaction_id: String,
    pub amount: u32,
    pub scholarship_name: String,
    pub university_name: String,
    pub application_id: Option<String>,
    pub record: RecordAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureView {
    pub message: String,
    /// Record left behind for a later retry, when one could be saved.
    pub application_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordKeepingFailure {
    pub transaction_id: String,
    pub amount: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Nothing to submit yet: no card widget or no client secret.
    Aborted,
    Failed(FailureView),
    Succeeded(SuccessView),
    RecordKeepingFailed(RecordKeepingFailure),
}

impl CheckoutOutcome {
    pub fn route(&self) -> Route {
        match self {
            CheckoutOutcome::Aborted | CheckoutOutcome::RecordKeepingFailed(_) => Route::Stay,
            CheckoutOutcome::Failed(_) => Route::PaymentFailed,
            CheckoutOutcome::Succeeded(_) => Route::PaymentSuccess,
        }
    }
}

/// Billing details for the card confirmation, from whoever is signed in.
pub fn billing_details(session: Option<&Session>) -> BillingDetails {
    BillingDetails::from_parts(
        session.and_then(|s| s.email.as_deref()),
        session.and_then(|s| s.display_name.as_deref()),
    )
}

pub struct CheckoutWorkflow<'a> {
    api: &'a ApiClient,
    payments: &'a dyn PaymentProvider,
    scholarship: Scholarship,
    session: Option<&'a Session>,
    client_secret: Option<ClientSecret>,
    inline_error: Option<String>,
}

impl<'a> CheckoutWorkflow<'a> {
    /// Prepares checkout for `scholarship`. Free scholarships never contact the
    /// payment backend and cannot be submitted.
    pub async fn mount(
        api: &'a ApiClient,
        payments: &'a dyn PaymentProvider,
        scholarship: Scholarship,
        session: Option<&'a Session>,
    ) -> Result<CheckoutWorkflow<'a>, ApiError> {
        let client_secret = if scholarship.requires_payment() {
            let secret = api.create_payment_intent(scholarship.application_fees).await?;
            tracing::debug!(scholarship_id = %scholarship.id, fee = scholarship.application_fees, "payment intent created");
            Some(ClientSecret::new(secret))
        } else {
            None
        };
        Ok(Self { api, payments, scholarship, session, client_secret, inline_error: None })
    }

    pub fn scholarship(&self) -> &Scholarship {
        &self.scholarship
    }

    pub fn amount(&self) -> u32 {
        self.scholarship.application_fees
    }

    pub fn can_submit(&self) -> bool {
        self.client_secret.is_some()
    }

    /// Last provider message to show under the card field.
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub async fn submit(&mut self, card: Option<&CardInput>) -> CheckoutOutcome {
        let Some(secret) = self.client_secret.clone() else {
            return CheckoutOutcome::Aborted;
        };
        let Some(card) = card else {
            tracing::debug!("card input not mounted, ignoring submit");
            return CheckoutOutcome::Aborted;
        };

        // A payment-method error is only displayed; confirmation still runs
        // and reports the definitive result.
        match self.payments.create_payment_method(card).await {
            Ok(_) => self.inline_error = None,
            Err(e) => {
                tracing::warn!(error = %e, "payment method creation failed");
                self.inline_error = Some(e.to_string());
            }
        }

        let billing = billing_details(self.session);

        match self.payments.confirm_card_payment(&secret, card, &billing).await {
            Ok(intent) if intent.succeeded() => {
                self.inline_error = None;
                self.record_success(&intent).await
            }
            Ok(intent) => {
                let message = format!("payment was not completed (status {:?})", intent.status);
                self.inline_error = Some(message.clone());
                self.record_failure(message).await
            }
            Err(e) => {
                let message = e.to_string();
                self.inline_error = Some(message.clone());
                self.record_failure(message).await
            }
        }
    }

    async fn record_failure(&self, message: String) -> CheckoutOutcome {
        tracing::info!(scholarship_id = %self.scholarship.id, %message, "payment failed");

        let existing = match self.existing_application().await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(error = ?e, "could not check for an existing application");
                None
            }
        };
        if let Some(app) = existing {
            tracing::info!(application_id = %app.id, "application already on file, not recording another");
            return CheckoutOutcome::Failed(FailureView { message, application_id: Some(app.id) });
        }

        let record = self.new_application(PaymentStatus::Unpaid, None);
        let application_id = match self.api.create_application(&record).await {
            Ok(res) => res.record_id().map(str::to_string),
            Err(e) => {
                tracing::error!(error = ?e, scholarship_id = %self.scholarship.id, "failed to save unpaid application");
                None
            }
        };
        CheckoutOutcome::Failed(FailureView { message, application_id })
    }

    async fn record_success(&self, intent: &PaymentIntent) -> CheckoutOutcome {
        tracing::info!(transaction_id = %intent.id, scholarship_id = %self.scholarship.id, "payment succeeded");

        match self.persist_paid(&intent.id).await {
            Ok((application_id, record)) => CheckoutOutcome::Succeeded(SuccessView {
                transaction_id: intent.id.clone(),
                amount: self.amount(),
                scholarship_name: self.scholarship.scholarship_name.clone(),
                university_name: self.scholarship.university_name.clone(),
                application_id,
                record,
            }),
            Err(message) => {
                tracing::error!(transaction_id = %intent.id, %message, "payment captured but application not saved");
                CheckoutOutcome::RecordKeepingFailed(RecordKeepingFailure {
                    transaction_id: intent.id.clone(),
                    amount: self.amount(),
                    message,
                })
            }
        }
    }

    async fn persist_paid(&self, transaction_id: &str) -> Result<(Option<String>, RecordAction), String> {
        let existing = self.existing_application().await.map_err(|e| e.to_string())?;

        match existing {
            Some(app) if app.payment_status == PaymentStatus::Unpaid => {
                let update = PaymentUpdate {
                    payment_status: PaymentStatus::Paid,
                    transaction_id: transaction_id.to_string(),
                };
                self.api.record_payment(&app.id, &update).await.map_err(|e| e.to_string())?;
                Ok((Some(app.id), RecordAction::MarkedPaid))
            }
            Some(app) => Ok((Some(app.id), RecordAction::AlreadyPaid)),
            None => {
                let record = self.new_application(PaymentStatus::Paid, Some(transaction_id.to_string()));
                let res = self.api.create_application(&record).await.map_err(|e| e.to_string())?;
                match res.record_id() {
                    Some(id) => Ok((Some(id.to_string()), RecordAction::Inserted)),
                    None => Err("server did not acknowledge the application".to_string()),
                }
            }
        }
    }

    /// The user's non-rejected application for this scholarship, preferring an
    /// unpaid one.
    async fn existing_application(&self) -> Result<Option<Application>, ApiError> {
        let Some(email) = self.session.and_then(|s| s.email.as_deref()) else {
            return Ok(None);
        };
        let mut mine: Vec<Application> = self
            .api
            .applications_for_user(email)
            .await?
            .into_iter()
            .filter(|a| a.scholarship_id == self.scholarship.id && a.is_active())
            .collect();
        mine.sort_by_key(|a| a.payment_status == PaymentStatus::Paid);
        Ok(mine.into_iter().next())
    }

    fn new_application(&self, payment_status: PaymentStatus, transaction_id: Option<String>) -> NewApplication {
        let s = &self.scholarship;
        NewApplication {
            scholarship_id: s.id.clone(),
            scholarship_name: s.scholarship_name.clone(),
            university_name: s.university_name.clone(),
            subject_category: s.subject_category.clone(),
            scholarship_category: s.scholarship_category.clone(),
            degree: s.degree.clone(),
            user_id: self.session.map(|u| u.uid.clone()),
            user_email: self.session.and_then(|u| u.email.clone()),
            user_name: self.session.and_then(|u| u.display_name.clone()),
            price: s.application_fees,
            service_charge: s.service_charge,
            application_date: Utc::now(),
            transaction_id,
            payment_status,
            status: ApplicationStatus::Pending,
        }
    }
}
