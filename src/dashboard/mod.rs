//! Role-gated dashboard views.
//!
//! Each view is constructed from the current session and refuses to build
//! for a role that should not see it. These checks only decide what the
//! client offers; the API authorizes every request on its own.

pub mod admin;
pub mod moderator;
pub mod student;

pub use admin::AdminDashboard;
pub use moderator::ModeratorDashboard;
pub use student::StudentDashboard;

use thiserror::Error;

use crate::api::ApiClient;
use crate::auth::Session;
use crate::error::ApiError;
use crate::models::{AdminStats, Application, ApplicationStatus, Role};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("sign in to use the dashboard")]
    Unauthenticated,

    #[error("{view} is not available to the {role} role")]
    Forbidden { role: Role, view: &'static str },

    /// The record's current state does not permit the action.
    #[error("{0}")]
    NotAllowed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Modal view state. Opening carries the record the dialog edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Dialog<T> {
    #[default]
    Closed,
    Open(T),
}

impl<T> Dialog<T> {
    pub fn open(&mut self, value: T) {
        *self = Dialog::Open(value);
    }

    pub fn close(&mut self) -> Option<T> {
        match std::mem::replace(self, Dialog::Closed) {
            Dialog::Open(v) => Some(v),
            Dialog::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Dialog::Open(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Dialog::Open(v) => Some(v),
            Dialog::Closed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Overview,
    MyApplications,
    MyReviews,
    BrowseScholarships,
    ManageApplications,
    ManageReviews,
    AddScholarship,
    ManageScholarships,
    ManageUsers,
    Analytics,
    Profile,
    Home,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Overview => "Overview",
            MenuItem::MyApplications => "My Applications",
            MenuItem::MyReviews => "My Reviews",
            MenuItem::BrowseScholarships => "Browse Scholarships",
            MenuItem::ManageApplications => "Manage Applications",
            MenuItem::ManageReviews => "Manage Reviews",
            MenuItem::AddScholarship => "Add Scholarship",
            MenuItem::ManageScholarships => "Manage Scholarships",
            MenuItem::ManageUsers => "Manage Users",
            MenuItem::Analytics => "Analytics",
            MenuItem::Profile => "Profile",
            MenuItem::Home => "Home",
        }
    }
}

pub fn menu_for(role: Role) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::Overview];
    match role {
        Role::Student => {
            items.extend([MenuItem::MyApplications, MenuItem::MyReviews, MenuItem::BrowseScholarships]);
        }
        Role::Moderator => {
            items.extend([MenuItem::ManageApplications, MenuItem::ManageReviews]);
        }
        Role::Admin => {
            items.extend([
                MenuItem::AddScholarship,
                MenuItem::ManageScholarships,
                MenuItem::ManageUsers,
                MenuItem::ManageApplications,
                MenuItem::ManageReviews,
                MenuItem::Analytics,
            ]);
        }
    }
    items.extend([MenuItem::Profile, MenuItem::Home]);
    items
}

pub const RECENT_APPLICATIONS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentOverview {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub recent: Vec<Application>,
}

impl StudentOverview {
    pub fn from_applications(applications: Vec<Application>) -> Self {
        let count = |status| applications.iter().filter(|a| a.status == status).count();
        let pending = count(ApplicationStatus::Pending);
        let completed = count(ApplicationStatus::Completed);
        let total = applications.len();
        let recent = applications.into_iter().take(RECENT_APPLICATIONS).collect();
        Self { total, pending, completed, recent }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overview {
    Student(StudentOverview),
    Moderator,
    Admin(AdminStats),
}

/// Landing page of the dashboard for whoever is signed in.
pub async fn overview(api: &ApiClient, session: Option<&Session>) -> Result<Overview, DashboardError> {
    let session = session.ok_or(DashboardError::Unauthenticated)?;
    match session.role {
        Role::Admin => Ok(Overview::Admin(api.admin_stats().await?)),
        Role::Moderator => Ok(Overview::Moderator),
        Role::Student => {
            let Some(email) = session.email.as_deref() else {
                return Ok(Overview::Student(StudentOverview::default()));
            };
            let applications = api.applications_for_user(email).await?;
            Ok(Overview::Student(StudentOverview::from_applications(applications)))
        }
    }
}

pub(crate) fn require_session(session: Option<&Session>) -> Result<&Session, DashboardError> {
    session.ok_or(DashboardError::Unauthenticated)
}
