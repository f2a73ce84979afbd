//! Core types and traits for SMO training

pub mod error;
pub mod params;
pub mod traits;
pub mod types;

pub use self::error::*;
pub use self::params::*;
pub use self::traits::*;
pub use self::types::*;
