use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Funding categories offered by the catalog filter.
pub const CATEGORIES: [&str; 3] = ["Full fund", "Partial", "Self-fund"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scholarship {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub scholarship_name: String,
    #[serde(default)]
    pub university_name: String,
    #[serde(default)]
    pub university_image: Option<String>,
    #[serde(default)]
    pub university_country: String,
    #[serde(default)]
    pub university_city: String,
    #[serde(default)]
    pub university_world_rank: Option<u32>,
    #[serde(default)]
    pub subject_category: String,
    #[serde(default)]
    pub scholarship_category: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub tuition_fees: Option<u32>,
    #[serde(default)]
    pub application_fees: u32,
    #[serde(default)]
    pub service_charge: u32,
    #[serde(default, with = "super::lenient_date")]
    pub application_deadline: NaiveDate,
    #[serde(default)]
    pub scholarship_post_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub posted_user_email: Option<String>,
}

impl Scholarship {
    pub fn requires_payment(&self) -> bool {
        self.application_fees > 0
    }

    pub fn location(&self) -> String {
        match (self.university_city.is_empty(), self.university_country.is_empty()) {
            (false, false) => format!("{}, {}", self.university_city, self.university_country),
            (false, true) => self.university_city.clone(),
            (true, false) => self.university_country.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Admin form payload for creating or replacing a scholarship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipInput {
    pub scholarship_name: String,
    pub university_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university_image: Option<String>,
    pub university_country: String,
    pub university_city: String,
    pub university_world_rank: u32,
    pub subject_category: String,
    pub scholarship_category: String,
    pub degree: String,
    #[serde(default)]
    pub tuition_fees: u32,
    pub application_fees: u32,
    pub service_charge: u32,
    #[serde(with = "super::lenient_date")]
    pub application_deadline: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_post_date: Option<DateTime<Utc>>,
}
