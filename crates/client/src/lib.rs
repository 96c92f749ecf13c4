//! `carpool-client`: client for the carpool REST API.
//!
//! - [`api`]: request layer (one JSON round trip per call)
//! - [`session`]: the persisted logged-in identity
//! - [`notify`]: transient, auto-dismissing notices
//! - [`views`]: page controllers producing view models
//! - [`app`]: route guard and [`Action`] dispatch over the controllers

pub mod action;
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod notify;
pub mod render;
pub mod route;
pub mod session;
pub mod views;

pub use action::Action;
pub use api::{ApiClient, Query};
pub use app::{App, Screen};
pub use config::ClientConfig;
pub use confirm::{AlwaysConfirm, Confirm, StdinConfirm};
pub use error::{ApiError, ClientError};
pub use notify::{Notice, Notifier, Severity};
pub use route::{Page, guard};
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage};
pub use views::Context;
