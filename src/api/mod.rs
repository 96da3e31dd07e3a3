//! API handlers for OpenShelf REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
