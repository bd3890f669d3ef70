use super::{require_session, DashboardError, Dialog};
use crate::api::ApiClient;
use crate::auth::Session;
use crate::models::{Application, ApplicationStatus, Review};

/// Manage Applications and Manage Reviews, shared by moderators and admins.
pub struct ModeratorDashboard<'a> {
    api: &'a ApiClient,
    feedback_dialog: Dialog<Application>,
}

impl<'a> ModeratorDashboard<'a> {
    pub fn new(api: &'a ApiClient, session: Option<&'a Session>) -> Result<Self, DashboardError> {
        let session = require_session(session)?;
        if !session.role.can_moderate() {
            return Err(DashboardError::Forbidden { role: session.role, view: "Manage Applications" });
        }
        Ok(Self { api, feedback_dialog: Dialog::Closed })
    }

    pub async fn applications(&self) -> Result<Vec<Application>, DashboardError> {
        Ok(self.api.applications().await?)
    }

    /// Moves `pending -> processing -> completed`. Returns the new status.
    pub async fn advance(&self, application: &Application) -> Result<ApplicationStatus, DashboardError> {
        let next = application.status.next().ok_or_else(|| {
            DashboardError::NotAllowed(format!("a {} application cannot be advanced", application.status))
        })?;
        self.api.set_application_status(&application.id, next).await?;
        tracing::info!(application_id = %application.id, from = %application.status, to = %next, "application status changed");
        Ok(next)
    }

    pub async fn reject(&self, application: &Application) -> Result<(), DashboardError> {
        if application.status.is_final() {
            return Err(DashboardError::NotAllowed(format!(
                "a {} application cannot be rejected",
                application.status
            )));
        }
        self.api.set_application_status(&application.id, ApplicationStatus::Rejected).await?;
        tracing::info!(application_id = %application.id, "application rejected");
        Ok(())
    }

    pub fn feedback_dialog(&self) -> &Dialog<Application> {
        &self.feedback_dialog
    }

    /// Opens the feedback form prefilled with the current feedback, if any.
    pub fn open_feedback(&mut self, application: Application) -> &str {
        self.feedback_dialog.open(application);
        self.feedback_dialog.get().and_then(|a| a.feedback.as_deref()).unwrap_or("")
    }

    pub async fn submit_feedback(&mut self, feedback: &str) -> Result<(), DashboardError> {
        let Some(application) = self.feedback_dialog.get() else {
            return Err(DashboardError::NotAllowed("no application selected for feedback".into()));
        };
        self.api.set_application_feedback(&application.id, feedback.trim()).await?;
        tracing::info!(application_id = %application.id, "feedback saved");
        self.feedback_dialog.close();
        Ok(())
    }

    pub async fn reviews(&self) -> Result<Vec<Review>, DashboardError> {
        Ok(self.api.reviews().await?)
    }

    pub async fn delete_review(&self, review_id: &str) -> Result<bool, DashboardError> {
        let res = self.api.delete_review(review_id).await?;
        tracing::info!(%review_id, "review removed by moderator");
        Ok(res.deleted())
    }
}
