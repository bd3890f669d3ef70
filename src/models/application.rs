use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// Review stage of an application. Moves `pending -> processing -> completed`;
/// anything not finished may be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Processing => "processing",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Status a moderator can advance to, if any.
    pub fn next(&self) -> Option<ApplicationStatus> {
        match self {
            ApplicationStatus::Pending => Some(ApplicationStatus::Processing),
            ApplicationStatus::Processing => Some(ApplicationStatus::Completed),
            ApplicationStatus::Completed | ApplicationStatus::Rejected => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Completed | ApplicationStatus::Rejected)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "processing" => Ok(ApplicationStatus::Processing),
            "completed" => Ok(ApplicationStatus::Completed),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

fn default_payment_status() -> PaymentStatus { PaymentStatus::Unpaid }
fn default_status() -> ApplicationStatus { ApplicationStatus::Pending }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    pub scholarship_id: String,
    #[serde(default)]
    pub scholarship_name: String,
    #[serde(default)]
    pub university_name: String,
    #[serde(default)]
    pub subject_category: Option<String>,
    #[serde(default)]
    pub scholarship_category: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub service_charge: Option<u32>,
    #[serde(default)]
    pub application_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
    #[serde(default = "default_status")]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Application {
    /// Counts toward the one-application-per-scholarship rule.
    pub fn is_active(&self) -> bool {
        self.status != ApplicationStatus::Rejected
    }
}

/// Insert payload for `POST /applications`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub scholarship_id: String,
    pub scholarship_name: String,
    pub university_name: String,
    pub subject_category: String,
    pub scholarship_category: String,
    pub degree: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub price: u32,
    pub service_charge: u32,
    pub application_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub status: ApplicationStatus,
}

/// Patch payload marking an existing record as paid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
    pub transaction_id: String,
}
