//! Catalog admin server library.
//!
//! Exposes the core building blocks (config, state, error handling, routes,
//! views) so integration tests and the binary entrypoint can both access
//! them.

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
pub mod views;
