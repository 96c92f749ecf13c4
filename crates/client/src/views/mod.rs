//! Page controllers.
//!
//! Each controller turns one user action into request-layer calls and returns
//! a view model. Failures never escape a controller: they are shown through
//! the [`Notifier`] and the handler returns `None`.

pub mod admin;
pub mod auth;
pub mod driver;
pub mod home;
pub mod passenger;

use std::sync::Arc;

use carpool_core::{DomainError, SessionIdentity};

use crate::api::ApiClient;
use crate::confirm::Confirm;
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::session::Session;

pub use admin::AdminView;
pub use auth::AuthView;
pub use driver::DriverView;
pub use home::HomeView;
pub use passenger::PassengerView;

/// Collaborators shared by every controller.
#[derive(Clone)]
pub struct Context {
    pub api: ApiClient,
    pub session: Session,
    pub notifier: Notifier,
    pub confirm: Arc<dyn Confirm>,
}

impl Context {
    pub fn new(
        api: ApiClient,
        session: Session,
        notifier: Notifier,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            confirm,
        }
    }

    pub(crate) fn require_user(&self) -> Result<SessionIdentity, ClientError> {
        self.session.current_user().ok_or(ClientError::Unauthenticated)
    }

    /// Show `result`'s failure, if any, and turn it into `None`.
    ///
    /// Validation failures are warnings with their own message; everything
    /// else is a danger notice, worded by `fallback` when one is given.
    pub(crate) fn report<T>(
        &self,
        action: &str,
        result: Result<T, ClientError>,
        fallback: Option<&str>,
    ) -> Option<T> {
        let err = match result {
            Ok(value) => return Some(value),
            Err(err) => err,
        };

        tracing::error!(action, error = %err, "action failed");
        match &err {
            ClientError::Domain(DomainError::Validation(msg)) => {
                self.notifier.warning(msg.clone());
            }
            ClientError::Domain(DomainError::NotFound(msg)) => {
                self.notifier.danger(msg.clone());
            }
            _ => {
                let message = fallback.map(str::to_string).unwrap_or_else(|| err.to_string());
                self.notifier.danger(message);
            }
        }
        None
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("api", &self.api)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Result of toggling a details panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    /// Freshly fetched content; the panel is now open.
    Opened(T),
    Closed,
}

impl<T> Panel<T> {
    pub fn is_open(&self) -> bool {
        matches!(self, Panel::Opened(_))
    }
}
