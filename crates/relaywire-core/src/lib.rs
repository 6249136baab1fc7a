//! relaywire core: message typing for the auction client protocol.
//!
//! This crate defines the wire-level contracts and error surface shared by
//! the client runtime and tooling. It carries no transport or runtime
//! dependencies: every operation is a pure function of its input, so values
//! can be parsed and encoded from any thread without synchronization.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `RelayError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, RelayError, Result};
