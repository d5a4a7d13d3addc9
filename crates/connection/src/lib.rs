//! Connection layer for kvbridge
//!
//! - lifecycle: the allocator contract and the single-handle `RawConnection`
//! - config: base, local and remote configs with their flag syntax
//! - handler: generic command dispatch over a backend's command table

#![warn(clippy::all)]

pub mod config;
pub mod handler;
pub mod lifecycle;

pub use config::{
    flag_number, flag_value, BaseConfig, ConnectionConfig, HostAndPort, LocalConfig, RemoteConfig,
    DEFAULT_HOST, DEFAULT_NS_SEPARATOR,
};
pub use handler::{CommandHandler, Handler, Interrupt};
pub use lifecycle::{test_connection, ConnectionAllocator, RawConnection};
