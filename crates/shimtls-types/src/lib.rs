#![forbid(unsafe_code)]
#![doc = "Common error codes and diagnostic reasons for shimtls."]

pub mod error;

pub use error::*;
