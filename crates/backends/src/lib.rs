//! Backends for kvbridge
//!
//! - backend: the [`Backend`] enum, its capability matrix and the translator factory
//! - config: per-backend connection configs
//! - redis, memcached, embedded: key translators for wire and embedded stores
//! - ssdb: the SSDB translator plus a full connection and command-handler stack

#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod embedded;
pub mod memcached;
pub mod redis;
mod render;
pub mod ssdb;

pub use backend::{translator_for, Backend};
pub use config::{
    LevelDbConfig, LmdbConfig, MemcachedConfig, RedisConfig, RocksDbConfig, SsdbConfig, UnqliteConfig,
    UpscaleDbConfig,
};
pub use embedded::EmbeddedTranslator;
pub use memcached::MemcachedTranslator;
pub use redis::RedisTranslator;
pub use ssdb::{MemoryConnector, SsdbRaw, SsdbTranslator};
