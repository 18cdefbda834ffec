//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the engines (clock, storage, admin
//! authorization) sits behind a trait. This crate provides in-memory
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod gate;
pub mod store;

pub use clock::NullClock;
pub use gate::NullGate;
pub use store::NullStore;
