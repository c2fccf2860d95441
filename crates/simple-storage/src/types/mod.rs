//! Type definitions shared across the pipeline
//!
//! Chain identifiers, the error enum, hex helpers and the secret wrapper
//! used for the private key.

pub mod chain;
pub mod error;
pub mod hex;
pub mod secret;

pub use chain::ChainId;
pub use error::{Error, Result};
pub use hex::Hex;
pub use secret::SecretString;
