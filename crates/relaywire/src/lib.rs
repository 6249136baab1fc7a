//! Top-level facade crate for relaywire.
//!
//! Re-exports the protocol core and the client runtime so users can depend on a single crate.

pub mod core {
    pub use relaywire_core::*;
}

pub mod client {
    pub use relaywire_client::*;
}
