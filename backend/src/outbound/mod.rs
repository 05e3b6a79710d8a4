//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process analytics ledger, invitation store and user store
//! - **static_token**: single-secret bearer token authoriser
//!
//! Adapters are thin translators between domain types and their backing
//! storage. They contain no dispatch logic.

pub mod memory;
pub mod static_token;
