use serde::{Deserialize, Serialize};

use super::{segment, ApiClient};
use crate::error::ApiError;
use crate::models::{DeleteResult, InsertResult, Scholarship, ScholarshipInput, UpdateResult};

/// Query string for `GET /all-scholarships`. Sorting goes out as either
/// `sortFees=asc|desc` or `sortDate=newest`, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipQuery {
    pub search: String,
    pub category: String,
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_fees: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_date: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipPage {
    #[serde(default)]
    pub scholarships: Vec<Scholarship>,
    #[serde(default)]
    pub total_scholarships: u64,
}

impl ApiClient {
    pub async fn search_scholarships(&self, query: &ScholarshipQuery) -> Result<ScholarshipPage, ApiError> {
        self.get_with_query("/all-scholarships", query).await
    }

    pub async fn top_scholarships(&self) -> Result<Vec<Scholarship>, ApiError> {
        self.get("/scholarships/top").await
    }

    pub async fn scholarship(&self, id: &str) -> Result<Scholarship, ApiError> {
        self.get(&format!("/scholarships/{}", segment(id))).await
    }

    pub async fn create_scholarship(&self, input: &ScholarshipInput) -> Result<InsertResult, ApiError> {
        self.post("/scholarships", input).await
    }

    pub async fn update_scholarship(&self, id: &str, input: &ScholarshipInput) -> Result<UpdateResult, ApiError> {
        self.patch(&format!("/scholarships/{}", segment(id)), input).await
    }

    pub async fn delete_scholarship(&self, id: &str) -> Result<DeleteResult, ApiError> {
        self.delete(&format!("/scholarships/{}", segment(id))).await
    }
}
