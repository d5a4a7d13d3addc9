//! Command layer for kvbridge
//!
//! Turns raw command text into validated, resolved commands and renders the
//! abstract key operations into each backend's wire syntax:
//! - tokenize: shell-style splitting, quoting and script splitting
//! - info / table: command metadata, per-backend tables and the resolver
//! - capability / translator: the key-operation capability contract

#![warn(clippy::all)]

pub mod capability;
pub mod info;
pub mod table;
pub mod tokenize;
pub mod translator;

pub use capability::{Capability, CapabilitySet};
pub use info::{ArgShape, CommandInfo};
pub use table::{CommandDescriptor, CommandIndex, CommandTable};
pub use tokenize::{join, parse_commands, quote, tokenize};
pub use translator::{KeyOperations, KeyTranslator};
