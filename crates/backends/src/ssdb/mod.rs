//! SSDB: a queue/KV server with ordered keys, hashmaps, sorted sets and
//! queues.
//!
//! - driver: the native client contract ([`QueueKvClient`], [`QueueKvConnector`])
//! - memory: an in-process driver for tests and offline use
//! - raw: [`SsdbRaw`], the connected wrapper with typed domain calls
//! - handlers: the command table and a handler per command
//! - translator: key operations rendered as SSDB command lines

pub mod driver;
pub mod handlers;
pub mod memory;
pub mod raw;
pub mod translator;

pub use driver::{NativeResult, QueueKvClient, QueueKvConnector, Status};
pub use handlers::{command_handler, command_table};
pub use memory::{MemoryClient, MemoryConnector};
pub use raw::{ServerInfo, SsdbAllocator, SsdbRaw, API_VERSION};
pub use translator::SsdbTranslator;
