// ReefAI - API Core
//
// This crate provides the backend API for reef tank compatibility analysis.
// One shared analysis pipeline (prompt building, model invocation, response
// normalization) sits behind an axum HTTP server; persistence is expressed
// as kernel traits with an in-memory implementation for tests and key-less
// local runs.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
