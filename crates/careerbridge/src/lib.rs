//! CareerBridge core: the user directory, job registry, application ledger,
//! and the access policy gating them.
//!
//! Persistent state sits behind per-collection repository traits so the
//! services can be exercised against in-memory adapters in tests and wired
//! to a hosted document store in production.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod registry;
pub mod store;
pub mod telemetry;
