use chrono::Utc;

use super::{require_session, DashboardError, Dialog};
use crate::api::ApiClient;
use crate::auth::Session;
use crate::models::review::{rating_in_range, MAX_RATING, MIN_RATING};
use crate::models::{Application, ApplicationStatus, NewReview, Review, ReviewUpdate, Role};

/// My Applications and My Reviews.
pub struct StudentDashboard<'a> {
    api: &'a ApiClient,
    session: &'a Session,
    review_dialog: Dialog<Application>,
    edit_dialog: Dialog<Review>,
}

fn validate_review(rating: u8, comment: &str) -> Result<String, DashboardError> {
    if !rating_in_range(rating) {
        return Err(DashboardError::InvalidInput(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(DashboardError::InvalidInput("review comment is required".into()));
    }
    Ok(comment.to_string())
}

impl<'a> StudentDashboard<'a> {
    pub fn new(api: &'a ApiClient, session: Option<&'a Session>) -> Result<Self, DashboardError> {
        let session = require_session(session)?;
        if session.role != Role::Student {
            return Err(DashboardError::Forbidden { role: session.role, view: "My Applications" });
        }
        Ok(Self { api, session, review_dialog: Dialog::Closed, edit_dialog: Dialog::Closed })
    }

    fn email(&self) -> Result<&str, DashboardError> {
        self.session
            .email
            .as_deref()
            .ok_or_else(|| DashboardError::NotAllowed("your account has no email address".into()))
    }

    pub async fn applications(&self) -> Result<Vec<Application>, DashboardError> {
        Ok(self.api.applications_for_user(self.email()?).await?)
    }

    /// Only applications still `pending` can be withdrawn.
    pub async fn delete_application(&self, application: &Application) -> Result<bool, DashboardError> {
        if application.status != ApplicationStatus::Pending {
            return Err(DashboardError::NotAllowed(format!(
                "only pending applications can be deleted (this one is {})",
                application.status
            )));
        }
        let res = self.api.delete_application(&application.id).await?;
        tracing::info!(application_id = %application.id, "application deleted");
        Ok(res.deleted())
    }

    pub fn review_dialog(&self) -> &Dialog<Application> {
        &self.review_dialog
    }

    /// Opens the review form for a `completed` application.
    pub fn open_review(&mut self, application: Application) -> Result<(), DashboardError> {
        if application.status != ApplicationStatus::Completed {
            return Err(DashboardError::NotAllowed(
                "reviews can only be added once an application is completed".into(),
            ));
        }
        self.review_dialog.open(application);
        Ok(())
    }

    /// Posts the review for the application in the open dialog and closes it.
    /// A validation error leaves the dialog open.
    pub async fn submit_review(&mut self, rating: u8, comment: &str) -> Result<Option<String>, DashboardError> {
        let Some(application) = self.review_dialog.get() else {
            return Err(DashboardError::NotAllowed("no application selected for review".into()));
        };
        let comment = validate_review(rating, comment)?;

        let review = NewReview {
            scholarship_id: application.scholarship_id.clone(),
            scholarship_name: application.scholarship_name.clone(),
            university_name: application.university_name.clone(),
            user_id: Some(self.session.uid.clone()),
            user_name: self.session.display_name.clone().unwrap_or_default(),
            user_email: self.session.email.clone(),
            user_image: self.session.photo_url.clone(),
            rating_point: rating,
            review_comment: comment,
            review_date: Utc::now(),
        };
        let res = self.api.create_review(&review).await?;
        self.review_dialog.close();
        tracing::info!(scholarship_id = %review.scholarship_id, rating, "review added");
        Ok(res.record_id().map(str::to_string))
    }

    pub async fn reviews(&self) -> Result<Vec<Review>, DashboardError> {
        Ok(self.api.reviews_by_user(self.email()?).await?)
    }

    pub fn edit_dialog(&self) -> &Dialog<Review> {
        &self.edit_dialog
    }

    pub fn open_edit(&mut self, review: Review) -> Result<(), DashboardError> {
        self.ensure_owner(&review)?;
        self.edit_dialog.open(review);
        Ok(())
    }

    pub async fn submit_edit(&mut self, rating: u8, comment: &str) -> Result<bool, DashboardError> {
        let Some(review) = self.edit_dialog.get() else {
            return Err(DashboardError::NotAllowed("no review selected for editing".into()));
        };
        let update = ReviewUpdate { rating_point: rating, review_comment: validate_review(rating, comment)? };
        let res = self.api.update_review(&review.id, &update).await?;
        tracing::info!(review_id = %review.id, "review updated");
        self.edit_dialog.close();
        Ok(res.modified_count.map_or(true, |n| n > 0))
    }

    pub async fn delete_review(&self, review: &Review) -> Result<bool, DashboardError> {
        self.ensure_owner(review)?;
        let res = self.api.delete_review(&review.id).await?;
        tracing::info!(review_id = %review.id, "review deleted");
        Ok(res.deleted())
    }

    fn ensure_owner(&self, review: &Review) -> Result<(), DashboardError> {
        match (&review.user_email, &self.session.email) {
            (Some(owner), Some(me)) if !owner.eq_ignore_ascii_case(me) => {
                Err(DashboardError::NotAllowed("that review belongs to someone else".into()))
            }
            _ => Ok(()),
        }
    }
}
