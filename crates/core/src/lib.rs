//! Core types for kvbridge
//!
//! This crate defines the backend-independent data model:
//! - Value: tagged reply value (scalars, arrays, sets, sorted sets, hashes)
//! - OutputNode: owned result tree that command handlers append to
//! - NKey / NDbKValue / NDbPSChannel: keys, key-value pairs and channels
//! - Error: the error taxonomy shared by every layer

#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod output;
pub mod value;

pub use error::{Error, Result};
pub use key::{NDbKValue, NDbPSChannel, NKey, Ttl};
pub use output::OutputNode;
pub use value::{HashValue, SetValue, Value, ValueType, ZSetValue, DEFAULT_DELIMITER};
