// Business domains
pub mod auth;
pub mod images;
pub mod setups;
