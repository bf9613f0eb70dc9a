pub mod models;
pub mod rut;
pub mod validation;
