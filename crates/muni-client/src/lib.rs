//! Client-side coordinator for the municipal services backend.
//!
//! Every request goes through [`SessionManager`], which owns the stored
//! bearer token and tears the session down on the first 401 it sees.
//! [`availability::AvailabilityProber`] debounces slot checks and
//! [`gate::RoleGate`] decides which views a session may reach.

pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod form;
pub mod gate;
pub mod navigator;
pub mod session;
pub mod storage;

pub use error::{ClientError, Result};
pub use navigator::{Navigator, Route};
pub use session::SessionManager;
