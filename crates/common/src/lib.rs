//! Common types for the review analyzer workspace

mod env;
mod error;
mod secret;

pub use env::EnvSource;
pub use error::{Error, Result};
pub use secret::Secret;
