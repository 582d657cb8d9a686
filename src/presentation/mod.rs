pub mod accounts;
pub mod auth;
pub mod categories;
pub mod handlers;
pub mod middleware;
pub mod routes;
