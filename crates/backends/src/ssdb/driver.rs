//! Native driver contract for the SSDB-style queue/KV wire client.
//!
//! This is the shape of the client library the backend drives: typed calls
//! returning either a value or a native [`Status`]. Range calls follow the
//! server's conventions: start bounds are exclusive, end bounds inclusive,
//! an empty bound is open, and a limit of zero means no limit.

use std::collections::BTreeMap;
use std::fmt;

use kvbridge_connection::HostAndPort;

/// Native status of a failed call, e.g. `not_found` or `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: String,
}

impl Status {
    /// Key, field or member is missing
    pub const NOT_FOUND: &'static str = "not_found";
    pub const ERROR: &'static str = "error";
    /// Malformed request
    pub const CLIENT_ERROR: &'static str = "client_error";
    /// Call made before a required `auth`
    pub const NO_AUTH: &'static str = "noauth";

    /// A status carrying `code`
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The `not_found` status
    pub fn not_found() -> Self {
        Self::new(Self::NOT_FOUND)
    }

    /// The generic `error` status
    pub fn error() -> Self {
        Self::new(Self::ERROR)
    }

    /// Native status code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether the key was missing
    pub fn is_not_found(&self) -> bool {
        self.code == Self::NOT_FOUND
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Result of a native call
pub type NativeResult<T> = std::result::Result<T, Status>;

/// A connected native client.
///
/// Scan-style calls return flattened `key, value` (or `member, score`)
/// pairs; `keys`-style calls return names only.
pub trait QueueKvClient: Send {
    /// Flattened `label, value` pairs of server statistics
    fn info(&mut self, section: &str) -> NativeResult<Vec<String>>;
    fn dbsize(&mut self) -> NativeResult<i64>;
    fn auth(&mut self, password: &str) -> NativeResult<()>;

    fn get(&mut self, key: &str) -> NativeResult<String>;
    fn set(&mut self, key: &str, value: &str) -> NativeResult<()>;
    /// Set with a TTL in seconds
    fn setx(&mut self, key: &str, value: &str, ttl: i64) -> NativeResult<()>;
    fn del(&mut self, key: &str) -> NativeResult<()>;
    fn incr(&mut self, key: &str, by: i64) -> NativeResult<i64>;
    fn keys(&mut self, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>>;
    fn scan(&mut self, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>>;
    fn rscan(&mut self, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>>;
    fn multi_get(&mut self, keys: &[String]) -> NativeResult<Vec<String>>;
    fn multi_set(&mut self, kvs: &BTreeMap<String, String>) -> NativeResult<()>;
    fn multi_del(&mut self, keys: &[String]) -> NativeResult<()>;

    fn hget(&mut self, name: &str, key: &str) -> NativeResult<String>;
    fn hset(&mut self, name: &str, key: &str, value: &str) -> NativeResult<()>;
    fn hdel(&mut self, name: &str, key: &str) -> NativeResult<()>;
    fn hincr(&mut self, name: &str, key: &str, by: i64) -> NativeResult<i64>;
    fn hsize(&mut self, name: &str) -> NativeResult<i64>;
    fn hclear(&mut self, name: &str) -> NativeResult<i64>;
    fn hkeys(&mut self, name: &str, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>>;
    fn hscan(&mut self, name: &str, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>>;
    fn hrscan(&mut self, name: &str, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>>;
    fn multi_hget(&mut self, name: &str, keys: &[String]) -> NativeResult<Vec<String>>;
    fn multi_hset(&mut self, name: &str, kvs: &BTreeMap<String, String>) -> NativeResult<()>;

    fn zget(&mut self, name: &str, key: &str) -> NativeResult<i64>;
    fn zset(&mut self, name: &str, key: &str, score: i64) -> NativeResult<()>;
    fn zdel(&mut self, name: &str, key: &str) -> NativeResult<()>;
    fn zincr(&mut self, name: &str, key: &str, by: i64) -> NativeResult<i64>;
    fn zsize(&mut self, name: &str) -> NativeResult<i64>;
    fn zclear(&mut self, name: &str) -> NativeResult<i64>;
    fn zrank(&mut self, name: &str, key: &str) -> NativeResult<i64>;
    fn zrrank(&mut self, name: &str, key: &str) -> NativeResult<i64>;
    fn zrange(&mut self, name: &str, offset: u64, limit: u64) -> NativeResult<Vec<String>>;
    fn zrrange(&mut self, name: &str, offset: u64, limit: u64) -> NativeResult<Vec<String>>;
    fn zkeys(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> NativeResult<Vec<String>>;
    fn zscan(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> NativeResult<Vec<String>>;
    fn zrscan(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> NativeResult<Vec<String>>;
    fn multi_zget(&mut self, name: &str, keys: &[String]) -> NativeResult<Vec<String>>;
    fn multi_zset(&mut self, name: &str, scores: &BTreeMap<String, i64>) -> NativeResult<()>;
    fn multi_zdel(&mut self, name: &str, keys: &[String]) -> NativeResult<()>;

    fn qpush(&mut self, name: &str, item: &str) -> NativeResult<()>;
    fn qpop(&mut self, name: &str) -> NativeResult<String>;
    /// Items between two inclusive indexes; negative indexes count from the back
    fn qslice(&mut self, name: &str, begin: i64, end: i64) -> NativeResult<Vec<String>>;
    fn qclear(&mut self, name: &str) -> NativeResult<i64>;

    fn expire(&mut self, key: &str, ttl: i64) -> NativeResult<()>;
    /// Remaining seconds, `-1` when the key has no TTL
    fn ttl(&mut self, key: &str) -> NativeResult<i64>;
}

/// Dials new native clients.
pub trait QueueKvConnector: Send + Sync {
    fn dial(&self, host: &HostAndPort) -> NativeResult<Box<dyn QueueKvClient>>;
}
