use serde::Deserialize;
use serde_json::json;

use super::{segment, ApiClient};
use crate::error::ApiError;
use crate::models::{AdminStats, DeleteResult, Role, UpdateResult, User};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

impl ApiClient {
    /// Exchanges a verified identity for the backend's own bearer token.
    pub async fn issue_token(&self, email: &str) -> Result<String, ApiError> {
        let res: TokenResponse = self.post("/jwt", &json!({ "email": email })).await?;
        Ok(res.token)
    }

    pub async fn user(&self, email: &str) -> Result<User, ApiError> {
        self.get(&format!("/users/{}", segment(email))).await
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users").await
    }

    pub async fn set_user_role(&self, id: &str, role: Role) -> Result<UpdateResult, ApiError> {
        self.patch(&format!("/users/{}/role", segment(id)), &json!({ "role": role })).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<DeleteResult, ApiError> {
        self.delete(&format!("/users/{}", segment(id))).await
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        self.get("/admin/stats").await
    }
}
