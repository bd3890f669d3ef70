//! Wire records exchanged with the scholarship API.
//!
//! The server owns every record; these types only mirror its camelCase JSON.

pub mod application;
pub mod review;
pub mod scholarship;
pub mod stats;
pub mod user;

pub use application::{Application, ApplicationStatus, NewApplication, PaymentStatus, PaymentUpdate};
pub use review::{NewReview, Review, ReviewUpdate};
pub use scholarship::{Scholarship, ScholarshipInput};
pub use stats::AdminStats;
pub use user::{Role, User};

use serde::Deserialize;

/// Body returned by insert endpoints. The server answers with either
/// `insertedId` or the stored document's `_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsertResult {
    #[serde(rename = "insertedId", default)]
    pub inserted_id: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

impl InsertResult {
    pub fn record_id(&self) -> Option<&str> {
        self.inserted_id.as_deref().or(self.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[serde(default)]
    pub matched_count: Option<u64>,
    #[serde(default)]
    pub modified_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

impl DeleteResult {
    pub fn deleted(&self) -> bool {
        self.deleted_count.map_or(true, |n| n > 0)
    }
}

/// Deadlines come back either as `YYYY-MM-DD` (form input) or as a full
/// RFC 3339 timestamp, depending on which screen created the record.
pub(crate) mod lenient_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
    }
}
