use super::{segment, ApiClient};
use crate::error::ApiError;
use crate::models::{DeleteResult, InsertResult, NewReview, Review, ReviewUpdate, UpdateResult};

impl ApiClient {
    pub async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get("/reviews").await
    }

    pub async fn reviews_for_scholarship(&self, scholarship_id: &str) -> Result<Vec<Review>, ApiError> {
        self.get(&format!("/reviews/{}", segment(scholarship_id))).await
    }

    pub async fn reviews_by_user(&self, email: &str) -> Result<Vec<Review>, ApiError> {
        self.get(&format!("/reviews/user/{}", segment(email))).await
    }

    pub async fn create_review(&self, review: &NewReview) -> Result<InsertResult, ApiError> {
        self.post("/reviews", review).await
    }

    pub async fn update_review(&self, id: &str, update: &ReviewUpdate) -> Result<UpdateResult, ApiError> {
        self.patch(&format!("/reviews/{}", segment(id)), update).await
    }

    pub async fn delete_review(&self, id: &str) -> Result<DeleteResult, ApiError> {
        self.delete(&format!("/reviews/{}", segment(id))).await
    }
}
