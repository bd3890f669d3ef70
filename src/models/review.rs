use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub scholarship_id: String,
    #[serde(default)]
    pub scholarship_name: Option<String>,
    #[serde(default)]
    pub university_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
    pub rating_point: u8,
    #[serde(default)]
    pub review_comment: String,
    #[serde(default)]
    pub review_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub scholarship_id: String,
    pub scholarship_name: String,
    pub university_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    pub rating_point: u8,
    pub review_comment: String,
    pub review_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub rating_point: u8,
    pub review_comment: String,
}

pub fn rating_in_range(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
