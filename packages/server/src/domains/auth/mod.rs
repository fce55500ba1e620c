//! Auth domain - bearer token verification for user-scoped routes
//!
//! Responsibilities:
//! - JWT creation and verification
//! - Claims carrying the user id that scopes every stored row

pub mod jwt;

pub use jwt::{Claims, JwtService};
