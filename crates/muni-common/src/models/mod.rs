pub mod admin;
pub mod auth;
pub mod chat;
pub mod document;
pub mod notification;
pub mod reservation;
