pub mod identity;
pub mod session;

pub use identity::{DisabledIdentityProvider, FirebaseIdentityProvider, Identity, IdentityProvider, ProfileUpdate};
pub use session::{role_of, with_profile, Session, SessionContext};

use thiserror::Error;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("identity provider rejected the request: {message}")]
    Provider { status: u16, message: String },

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider is not configured: {0}")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}
