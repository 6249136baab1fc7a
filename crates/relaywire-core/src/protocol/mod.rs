//! Protocol modules.
//!
//! - `oneof`: exclusivity matcher shared by every union below.
//! - `envelope`: generic wrapper resolving raw input to one variant.
//! - `client` / `server`: the concrete auction message set.
//! - `model`: records nested inside those messages.
//!
//! All parsers are panic-free: malformed input is reported as `RelayError`,
//! with per-variant diagnostics when no variant accepts it.

pub mod client;
pub mod envelope;
pub mod model;
pub mod oneof;
pub mod server;

pub use client::{ClientMessage, ClientRequest, Method};
pub use envelope::Envelope;
pub use oneof::{resolve, OneOf, Variant};
pub use server::{ServerMessage, ServerResultMessage, ServerResultResponse, ServerUpdateResponse};
