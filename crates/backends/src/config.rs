//! Per-backend connection configs.
//!
//! Each config extends [`LocalConfig`] or [`RemoteConfig`] with the backend's
//! own flags. Backend flags are only serialized when they differ from the
//! default, so a default config serializes to the common flags alone.

use kvbridge_connection::{
    flag_number, flag_value, ConnectionConfig, HostAndPort, LocalConfig, RemoteConfig,
};
use kvbridge_core::Result;
use serde::{Deserialize, Serialize};

/// Default Redis port
pub const REDIS_DEFAULT_PORT: u16 = 6379;
/// Default Memcached port
pub const MEMCACHED_DEFAULT_PORT: u16 = 11211;
/// Default SSDB port
pub const SSDB_DEFAULT_PORT: u16 = 8888;

/// `MDB_NOSUBDIR`: the path names a file, not a directory
pub const LMDB_NOSUBDIR: u32 = 0x4000;
/// `MDB_RDONLY`
pub const LMDB_RDONLY: u32 = 0x20000;
/// Environment flags used when none are given
pub const LMDB_DEFAULT_ENV_FLAGS: u32 = LMDB_NOSUBDIR;

/// `UNQLITE_OPEN_CREATE`
pub const UNQLITE_OPEN_CREATE: u32 = 0x0000_0004;
/// `UNQLITE_OPEN_READWRITE`
pub const UNQLITE_OPEN_READWRITE: u32 = 0x0000_0002;
/// Environment flags used when `-e` is absent
pub const UNQLITE_DEFAULT_ENV_FLAGS: u32 = UNQLITE_OPEN_READWRITE;

fn push_flag(args: &mut Vec<String>, flag: &str, value: impl ToString) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

/// Redis server settings: `-n` (database index) and `-a` (password) on top of the remote flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(flatten)]
    pub remote: RemoteConfig,
    /// Database selected after connect
    pub db_index: u32,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::new(HostAndPort::local_host(REDIS_DEFAULT_PORT)),
            db_index: 0,
            password: None,
        }
    }
}

impl ConnectionConfig for RedisConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-n" => self.db_index = flag_number(flag, value)?,
            "-a" => self.password = Some(flag_value(flag, value)?.to_string()),
            _ => return self.remote.apply_flag(flag, value),
        }
        Ok(Some(2))
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.remote.args();
        if self.db_index != 0 {
            push_flag(&mut args, "-n", self.db_index);
        }
        if let Some(password) = &self.password {
            push_flag(&mut args, "-a", password);
        }
        args
    }
}

/// Memcached; empty `user`/`password` mean no SASL credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemcachedConfig {
    #[serde(flatten)]
    pub remote: RemoteConfig,
    pub user: String,
    pub password: String,
}

impl Default for MemcachedConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::new(HostAndPort::local_host(MEMCACHED_DEFAULT_PORT)),
            user: String::new(),
            password: String::new(),
        }
    }
}

impl ConnectionConfig for MemcachedConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-u" => self.user = flag_value(flag, value)?.to_string(),
            "-a" => self.password = flag_value(flag, value)?.to_string(),
            _ => return self.remote.apply_flag(flag, value),
        }
        Ok(Some(2))
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.remote.args();
        if !self.user.is_empty() {
            push_flag(&mut args, "-u", &self.user);
        }
        if !self.password.is_empty() {
            push_flag(&mut args, "-a", &self.password);
        }
        args
    }
}

/// SSDB server settings: `-a` (password) on top of the remote flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsdbConfig {
    #[serde(flatten)]
    pub remote: RemoteConfig,
    /// Sent with `auth` right after connecting
    pub password: Option<String>,
}

impl Default for SsdbConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::new(HostAndPort::local_host(SSDB_DEFAULT_PORT)),
            password: None,
        }
    }
}

impl SsdbConfig {
    /// Delimiter for flattened replies
    pub fn delimiter(&self) -> &str {
        &self.remote.base.delimiter
    }
}

impl ConnectionConfig for SsdbConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-a" => {
                self.password = Some(flag_value(flag, value)?.to_string());
                Ok(Some(2))
            }
            _ => self.remote.apply_flag(flag, value),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.remote.args();
        if let Some(password) = &self.password {
            push_flag(&mut args, "-a", password);
        }
        args
    }
}

/// LevelDB and RocksDB share one shape: a path and create-if-missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDbConfig {
    #[serde(flatten)]
    pub local: LocalConfig,
    pub create_if_missing: bool,
}

impl LevelDbConfig {
    fn with_path(path: &str) -> Self {
        Self {
            local: LocalConfig::new(path),
            create_if_missing: false,
        }
    }
}

impl Default for LevelDbConfig {
    fn default() -> Self {
        Self::with_path("~/test.leveldb")
    }
}

impl ConnectionConfig for LevelDbConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-c" => {
                self.create_if_missing = true;
                Ok(Some(1))
            }
            _ => self.local.apply_flag(flag, value),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.local.args();
        if self.create_if_missing {
            args.push("-c".to_string());
        }
        args
    }
}

/// RocksDB settings; the flags are those of [`LevelDbConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocksDbConfig(pub LevelDbConfig);

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self(LevelDbConfig::with_path("~/test.rocksdb"))
    }
}

impl ConnectionConfig for RocksDbConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        self.0.apply_flag(flag, value)
    }

    fn args(&self) -> Vec<String> {
        self.0.args()
    }
}

/// LMDB settings: `-f` (path) and `-e` (environment flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmdbConfig {
    #[serde(flatten)]
    pub local: LocalConfig,
    pub env_flags: u32,
}

impl LmdbConfig {
    /// Whether the environment opens read-only
    pub fn is_read_only(&self) -> bool {
        self.env_flags & LMDB_RDONLY != 0
    }

    /// Toggle the read-only environment flag.
    pub fn set_read_only(&mut self, read_only: bool) {
        if read_only {
            self.env_flags |= LMDB_RDONLY;
        } else {
            self.env_flags &= !LMDB_RDONLY;
        }
    }
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            local: LocalConfig::new("~/test.lmdb"),
            env_flags: LMDB_DEFAULT_ENV_FLAGS,
        }
    }
}

impl ConnectionConfig for LmdbConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-e" => {
                self.env_flags = flag_number(flag, value)?;
                Ok(Some(2))
            }
            _ => self.local.apply_flag(flag, value),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.local.args();
        if self.env_flags != LMDB_DEFAULT_ENV_FLAGS {
            push_flag(&mut args, "-e", self.env_flags);
        }
        args
    }
}

/// UnQLite settings: `-f`, `-c` (create if missing) and `-e`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnqliteConfig {
    #[serde(flatten)]
    pub local: LocalConfig,
    pub create_if_missing: bool,
    pub env_flags: u32,
}

impl Default for UnqliteConfig {
    fn default() -> Self {
        Self {
            local: LocalConfig::new("~/test.unqlite"),
            create_if_missing: false,
            env_flags: UNQLITE_DEFAULT_ENV_FLAGS,
        }
    }
}

impl ConnectionConfig for UnqliteConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-c" => {
                self.create_if_missing = true;
                Ok(Some(1))
            }
            "-e" => {
                self.env_flags = flag_number(flag, value)?;
                Ok(Some(2))
            }
            _ => self.local.apply_flag(flag, value),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.local.args();
        if self.create_if_missing {
            args.push("-c".to_string());
        }
        if self.env_flags != UNQLITE_DEFAULT_ENV_FLAGS {
            push_flag(&mut args, "-e", self.env_flags);
        }
        args
    }
}

/// UpscaleDB settings: `-f` and `-c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpscaleDbConfig {
    #[serde(flatten)]
    pub local: LocalConfig,
    pub create_if_missing: bool,
    /// Database number inside the environment
    pub db_number: u16,
}

impl Default for UpscaleDbConfig {
    fn default() -> Self {
        Self {
            local: LocalConfig::new("~/test.upscaledb"),
            create_if_missing: false,
            db_number: 1,
        }
    }
}

impl ConnectionConfig for UpscaleDbConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-c" => {
                self.create_if_missing = true;
                Ok(Some(1))
            }
            "-n" => {
                self.db_number = flag_number(flag, value)?;
                Ok(Some(2))
            }
            _ => self.local.apply_flag(flag, value),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.local.args();
        if self.create_if_missing {
            args.push("-c".to_string());
        }
        if self.db_number != 1 {
            push_flag(&mut args, "-n", self.db_number);
        }
        args
    }
}
