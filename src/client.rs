//! Client facade for the Neptune bulk loader.
//!
//! Keep the public surface small: one config entry point, one handler field
//! per loader operation.

pub mod builder;
pub mod core;

pub use builder::NeptuneClientBuilder;
pub use self::core::{ClientConfig, NeptuneClient};
