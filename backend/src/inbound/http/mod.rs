//! HTTP inbound adapter exposing the admin surface and health probes.

pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
