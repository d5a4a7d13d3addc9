//! The set of supported backends and their capability matrix.

use std::fmt;
use std::str::FromStr;

use kvbridge_command::{Capability, CapabilitySet, KeyTranslator};
use kvbridge_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::embedded::EmbeddedTranslator;
use crate::memcached::MemcachedTranslator;
use crate::redis::RedisTranslator;
use crate::ssdb::SsdbTranslator;

const KEY_CRUD: CapabilitySet = CapabilitySet::empty()
    .with(Capability::CreateKey)
    .with(Capability::LoadKey)
    .with(Capability::DeleteKey);

const EMBEDDED: CapabilitySet = KEY_CRUD.with(Capability::RenameKey).with(Capability::FlushDB);

/// A supported key/value backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    Redis,
    Memcached,
    Ssdb,
    LevelDb,
    RocksDb,
    Lmdb,
    UnQLite,
    UpscaleDb,
}

impl Backend {
    /// Every backend
    pub fn all() -> &'static [Backend] {
        &[
            Backend::Redis,
            Backend::Memcached,
            Backend::Ssdb,
            Backend::LevelDb,
            Backend::RocksDb,
            Backend::Lmdb,
            Backend::UnQLite,
            Backend::UpscaleDb,
        ]
    }

    /// Lower-case name, as parsed by [`FromStr`](std::str::FromStr).
    pub fn name(self) -> &'static str {
        match self {
            Backend::Redis => "Redis",
            Backend::Memcached => "Memcached",
            Backend::Ssdb => "SSDB",
            Backend::LevelDb => "LevelDB",
            Backend::RocksDb => "RocksDB",
            Backend::Lmdb => "LMDB",
            Backend::UnQLite => "UnQLite",
            Backend::UpscaleDb => "UpscaleDB",
        }
    }

    /// Embedded stores open a local path; the rest dial a server.
    pub fn is_remote(self) -> bool {
        matches!(self, Backend::Redis | Backend::Memcached | Backend::Ssdb)
    }

    /// The backend's capability matrix row.
    pub fn capabilities(self) -> CapabilitySet {
        match self {
            Backend::Redis => CapabilitySet::ALL,
            Backend::Memcached => KEY_CRUD.with(Capability::ChangeKeyTTL).with(Capability::FlushDB),
            Backend::Ssdb => KEY_CRUD
                .with(Capability::ChangeKeyTTL)
                .with(Capability::LoadKeyTTL)
                .with(Capability::FlushDB),
            Backend::LevelDb | Backend::UnQLite => EMBEDDED,
            Backend::RocksDb | Backend::Lmdb | Backend::UpscaleDb => {
                EMBEDDED.with(Capability::SelectDB)
            }
        }
    }

    /// Whether the matrix row declares `capability`.
    pub fn supports(self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    /// Case-insensitive backend name.
    fn from_str(s: &str) -> Result<Self> {
        Backend::all()
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_argument(format!("unknown backend '{}'", s)))
    }
}

/// Build the key translator for `backend`.
pub fn translator_for(backend: Backend) -> Result<Box<dyn KeyTranslator>> {
    Ok(match backend {
        Backend::Redis => Box::new(RedisTranslator::new()?),
        Backend::Memcached => Box::new(MemcachedTranslator::new()?),
        Backend::Ssdb => Box::new(SsdbTranslator::new()?),
        embedded => Box::new(EmbeddedTranslator::new(embedded)?),
    })
}
