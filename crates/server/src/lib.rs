//! Ames price prediction service
//!
//! Thin axum front over the shared model crate: the artifact is loaded once
//! at startup, wrapped in `Arc`, and read by every request without locking.

pub mod server;

pub use server::{build_router, start_server, AppState};
