pub mod error;
pub mod models;
pub mod repository;
pub mod requests;
pub mod user;
