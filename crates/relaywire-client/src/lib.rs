//! relaywire client library entry.
//!
//! This crate wires config, the frame codec, request correlation, and update
//! dispatch into a transport-free session. It is consumed by the replay
//! binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod codec;
pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod handlers;
pub mod session;
