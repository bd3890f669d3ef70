use chrono::Utc;

use super::{require_session, DashboardError};
use crate::api::{ApiClient, ScholarshipPage, ScholarshipQuery};
use crate::auth::Session;
use crate::models::{AdminStats, Role, ScholarshipInput, User};

/// Scholarship, user and analytics management.
pub struct AdminDashboard<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

pub fn validate_scholarship(input: &ScholarshipInput) -> Result<(), DashboardError> {
    let required = [
        ("scholarship name", &input.scholarship_name),
        ("university name", &input.university_name),
        ("country", &input.university_country),
        ("city", &input.university_city),
        ("subject category", &input.subject_category),
        ("scholarship category", &input.scholarship_category),
        ("degree", &input.degree),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(DashboardError::InvalidInput(format!("{field} is required")));
    }
    if input.university_world_rank < 1 {
        return Err(DashboardError::InvalidInput("world rank must be at least 1".into()));
    }
    Ok(())
}

impl<'a> AdminDashboard<'a> {
    pub fn new(api: &'a ApiClient, session: Option<&'a Session>) -> Result<Self, DashboardError> {
        let session = require_session(session)?;
        if !session.role.is_admin() {
            return Err(DashboardError::Forbidden { role: session.role, view: "Admin" });
        }
        Ok(Self { api, session })
    }

    pub async fn scholarships(&self, page: u32, limit: u32) -> Result<ScholarshipPage, DashboardError> {
        let query = ScholarshipQuery { page: page.max(1), limit: limit.max(1), ..Default::default() };
        Ok(self.api.search_scholarships(&query).await?)
    }

    /// Stamps the poster and post date, then creates the scholarship.
    pub async fn add_scholarship(&self, mut input: ScholarshipInput) -> Result<Option<String>, DashboardError> {
        validate_scholarship(&input)?;
        if input.posted_user_email.is_none() {
            input.posted_user_email = self.session.email.clone();
        }
        input.scholarship_post_date.get_or_insert_with(Utc::now);
        let res = self.api.create_scholarship(&input).await?;
        tracing::info!(name = %input.scholarship_name, id = ?res.record_id(), "scholarship added");
        Ok(res.record_id().map(str::to_string))
    }

    pub async fn update_scholarship(&self, id: &str, input: &ScholarshipInput) -> Result<bool, DashboardError> {
        validate_scholarship(input)?;
        let res = self.api.update_scholarship(id, input).await?;
        tracing::info!(%id, "scholarship updated");
        Ok(res.modified_count.map_or(true, |n| n > 0))
    }

    pub async fn delete_scholarship(&self, id: &str) -> Result<bool, DashboardError> {
        let res = self.api.delete_scholarship(id).await?;
        tracing::info!(%id, "scholarship deleted");
        Ok(res.deleted())
    }

    pub async fn users(&self) -> Result<Vec<User>, DashboardError> {
        Ok(self.api.users().await?)
    }

    pub async fn set_role(&self, user: &User, role: Role) -> Result<(), DashboardError> {
        self.ensure_not_self(user, "change your own role")?;
        let id = user_id(user)?;
        self.api.set_user_role(id, role).await?;
        tracing::info!(user = %user.email, %role, "role changed");
        Ok(())
    }

    pub async fn delete_user(&self, user: &User) -> Result<bool, DashboardError> {
        self.ensure_not_self(user, "delete your own account")?;
        let res = self.api.delete_user(user_id(user)?).await?;
        tracing::info!(user = %user.email, "user deleted");
        Ok(res.deleted())
    }

    pub async fn stats(&self) -> Result<AdminStats, DashboardError> {
        Ok(self.api.admin_stats().await?)
    }

    fn ensure_not_self(&self, user: &User, what: &str) -> Result<(), DashboardError> {
        match self.session.email.as_deref() {
            Some(me) if me.eq_ignore_ascii_case(&user.email) => {
                Err(DashboardError::NotAllowed(format!("you cannot {what}")))
            }
            _ => Ok(()),
        }
    }
}

fn user_id(user: &User) -> Result<&str, DashboardError> {
    user.id
        .as_deref()
        .ok_or_else(|| DashboardError::NotAllowed(format!("user {} has no id", user.email)))
}
