//! Typed wrappers for each backend service.
//!
//! All of them share one [`SessionManager`](crate::SessionManager), so the
//! bearer token and the 401 handling are applied uniformly.

pub mod admin;
pub mod auth;
pub mod chatbot;
pub mod digitization;
pub mod documents;
pub mod notifications;
pub mod reservations;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use chatbot::ChatbotApi;
pub use digitization::DigitizationApi;
pub use documents::DocumentsApi;
pub use notifications::NotificationsApi;
pub use reservations::ReservationsApi;
