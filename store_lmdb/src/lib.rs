//! LMDB storage backend for the agora voting service.
//!
//! Implements the storage traits from `agora-store` using the `heed` LMDB
//! bindings. All databases live in a single environment; every conditional
//! mutation runs inside one write transaction, which LMDB serializes, so
//! status preconditions and the unique voter index hold under concurrency.

pub mod environment;
pub mod error;
pub mod proposal;
pub mod vote;

pub use environment::LmdbStore;
pub use error::LmdbError;
