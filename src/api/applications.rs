use serde_json::json;

use super::{segment, ApiClient};
use crate::error::ApiError;
use crate::models::{
    Application, ApplicationStatus, DeleteResult, InsertResult, NewApplication, PaymentUpdate, UpdateResult,
};

impl ApiClient {
    /// Every application, for moderators and admins.
    pub async fn applications(&self) -> Result<Vec<Application>, ApiError> {
        self.get("/applications").await
    }

    pub async fn applications_for_user(&self, email: &str) -> Result<Vec<Application>, ApiError> {
        self.get(&format!("/applications/my-applications/{}", segment(email))).await
    }

    pub async fn create_application(&self, application: &NewApplication) -> Result<InsertResult, ApiError> {
        self.post("/applications", application).await
    }

    pub async fn record_payment(&self, id: &str, update: &PaymentUpdate) -> Result<UpdateResult, ApiError> {
        self.patch(&format!("/applications/{}", segment(id)), update).await
    }

    pub async fn set_application_status(&self, id: &str, status: ApplicationStatus) -> Result<UpdateResult, ApiError> {
        self.patch(&format!("/applications/{}/status", segment(id)), &json!({ "status": status })).await
    }

    pub async fn set_application_feedback(&self, id: &str, feedback: &str) -> Result<UpdateResult, ApiError> {
        self.patch(&format!("/applications/{}/feedback", segment(id)), &json!({ "feedback": feedback })).await
    }

    pub async fn delete_application(&self, id: &str) -> Result<DeleteResult, ApiError> {
        self.delete(&format!("/applications/{}", segment(id))).await
    }
}
