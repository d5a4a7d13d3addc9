//! kvbridge - one command syntax and one result model over many key/value backends
//!
//! kvbridge tokenizes textual commands, validates them against a per-backend
//! command table, translates abstract key operations into each backend's wire
//! syntax and materializes replies as a uniform [`OutputNode`] tree.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use kvbridge::{ssdb, OutputNode, SsdbConfig};
//!
//! let mut raw = ssdb::SsdbRaw::new(Arc::new(ssdb::MemoryConnector::new()), SsdbConfig::default());
//! raw.connect()?;
//!
//! let handler = ssdb::command_handler()?;
//! let mut out = OutputNode::default();
//! handler.execute(&mut raw, "SET foo bar", &mut out)?;
//! assert_eq!(out.to_display_string(), "STORED");
//! ```
//!
//! # Architecture
//!
//! - [`kvbridge_core`]: values, output tree, keys and errors
//! - [`kvbridge_command`]: tokenizer, command tables and the key-operation contract
//! - [`kvbridge_connection`]: connection lifecycle, configs and command dispatch
//! - [`kvbridge_backends`]: the backend translators and the SSDB stack

pub use kvbridge_backends as backends;
pub use kvbridge_command as command;
pub use kvbridge_connection as connection;

pub use kvbridge_backends::{ssdb, translator_for, Backend, SsdbConfig};
pub use kvbridge_command::{
    parse_commands, tokenize, Capability, CapabilitySet, CommandTable, KeyOperations, KeyTranslator,
};
pub use kvbridge_connection::{CommandHandler, ConnectionAllocator, ConnectionConfig, Interrupt, RawConnection};
pub use kvbridge_core::{Error, HashValue, NDbKValue, NKey, OutputNode, Result, Ttl, Value, ValueType};
