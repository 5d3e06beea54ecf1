//! JSON CRUD service for a list of todo items, persisted in an embedded
//! `sled` database.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use routes::router;
pub use state::AppState;
