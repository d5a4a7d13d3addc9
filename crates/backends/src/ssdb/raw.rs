//! Connected SSDB wrapper: typed domain calls over one native client.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use kvbridge_connection::{ConnectionAllocator, RawConnection};
use kvbridge_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::driver::{NativeResult, QueueKvClient, QueueKvConnector};
use crate::backend::Backend;
use crate::config::SsdbConfig;

/// Client API version the wrapper is written against
pub const API_VERSION: &str = "1.9.2";

/// Opens native clients through a [`QueueKvConnector`].
#[derive(Clone)]
pub struct SsdbAllocator {
    connector: Arc<dyn QueueKvConnector>,
}

impl SsdbAllocator {
    /// Allocator dialing through `connector`
    pub fn new(connector: Arc<dyn QueueKvConnector>) -> Self {
        Self { connector }
    }
}

impl ConnectionAllocator for SsdbAllocator {
    type Handle = Box<dyn QueueKvClient>;
    type Config = SsdbConfig;

    fn backend_name(&self) -> &'static str {
        Backend::Ssdb.name()
    }

    /// Dial the configured host, then authenticate if a password is set.
    fn connect(&self, config: &SsdbConfig) -> Result<Box<dyn QueueKvClient>> {
        let host = &config.remote.host;
        let mut client = self
            .connector
            .dial(host)
            .map_err(|status| Error::connection(format!("{}: {}", host, status)))?;
        if let Some(password) = &config.password {
            client
                .auth(password)
                .map_err(|status| Error::connection(format!("authentication failed: {}", status)))?;
            debug!(target: "kvbridge::conn", %host, "Authenticated");
        }
        Ok(client)
    }
}

/// Server statistics reported by `info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub version: String,
    pub links: u32,
    pub total_calls: u64,
    pub dbsize: u64,
    pub binlogs: String,
}

impl ServerInfo {
    /// Build from flattened `label, value` pairs. Unknown labels are ignored.
    pub fn from_pairs(pairs: &[String]) -> Result<Self> {
        // Some servers prefix the reply with their name.
        let body = match pairs.first() {
            Some(first) if first == "ssdb-server" => &pairs[1..],
            _ => pairs,
        };
        let mut info = ServerInfo::default();
        for pair in body.chunks(2) {
            let [label, value] = pair else {
                return Err(Error::wire("info", "odd number of info fields"));
            };
            let malformed = || Error::wire("info", format!("malformed {} '{}'", label, value));
            match label.as_str() {
                "version" => info.version = value.clone(),
                "links" => info.links = value.trim().parse().map_err(|_| malformed())?,
                "total_calls" => info.total_calls = value.trim().parse().map_err(|_| malformed())?,
                "dbsize" => info.dbsize = value.trim().parse().map_err(|_| malformed())?,
                "binlogs" => info.binlogs = value.clone(),
                _ => {}
            }
        }
        Ok(info)
    }
}

impl fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version:{}", self.version)?;
        writeln!(f, "links:{}", self.links)?;
        writeln!(f, "total_calls:{}", self.total_calls)?;
        writeln!(f, "dbsize:{}", self.dbsize)?;
        write!(f, "binlogs:{}", self.binlogs)
    }
}

/// A single SSDB connection with typed domain operations.
///
/// Every operation requires a live connection and fails with
/// [`Error::PreconditionViolation`] otherwise. Native failures become
/// [`Error::WireProtocol`] carrying the operation name and native status.
pub struct SsdbRaw {
    conn: RawConnection<SsdbAllocator>,
}

impl SsdbRaw {
    /// A disconnected wrapper; call [`connect`](Self::connect) before any operation.
    pub fn new(connector: Arc<dyn QueueKvConnector>, config: SsdbConfig) -> Self {
        Self {
            conn: RawConnection::new(SsdbAllocator::new(connector), config),
        }
    }

    /// Dial and, when a password is configured, authenticate.
    pub fn connect(&mut self) -> Result<()> {
        self.conn.connect()
    }

    /// Drop the native client. Idempotent.
    pub fn disconnect(&mut self) -> Result<()> {
        self.conn.disconnect()
    }

    /// Whether a native client is held
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Settings the connection is opened with
    pub fn config(&self) -> &SsdbConfig {
        self.conn.config()
    }

    /// Delimiter for flattened replies
    pub fn delimiter(&self) -> &str {
        self.conn.config().delimiter()
    }

    /// See [`API_VERSION`].
    pub fn version_api(&self) -> &'static str {
        API_VERSION
    }

    fn call<R>(
        &mut self,
        operation: &str,
        f: impl FnOnce(&mut dyn QueueKvClient) -> NativeResult<R>,
    ) -> Result<R> {
        let client = self.conn.handle_mut(operation)?;
        f(client.as_mut()).map_err(|status| Error::wire(operation, status.code()))
    }

    /// Server statistics; malformed replies are a wire error.
    pub fn info(&mut self, section: &str) -> Result<ServerInfo> {
        let pairs = self.call("info", |c| c.info(section))?;
        ServerInfo::from_pairs(&pairs)
    }

    /// Approximate number of stored keys
    pub fn dbsize(&mut self) -> Result<u64> {
        let size = self.call("dbsize", |c| c.dbsize())?;
        u64::try_from(size).map_err(|_| Error::wire("dbsize", format!("negative size {}", size)))
    }

    /// Authenticate an already open connection.
    pub fn auth(&mut self, password: &str) -> Result<()> {
        self.call("auth", |c| c.auth(password))
    }

    /// The server has no help call.
    pub fn help(&mut self, _command: Option<&str>) -> Result<String> {
        self.conn.handle("help")?;
        Err(Error::not_supported("help", Backend::Ssdb.name()))
    }

    /// Value of `key`; a missing key is a `not_found` wire error.
    pub fn get(&mut self, key: &str) -> Result<String> {
        self.call("get", |c| c.get(key))
    }

    /// Store `value` under `key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.call("set", |c| c.set(key, value))
    }

    /// Set `key` expiring after `ttl` seconds.
    pub fn setx(&mut self, key: &str, value: &str, ttl: i64) -> Result<()> {
        self.call("setx", |c| c.setx(key, value, ttl))
    }

    /// Delete `key`.
    pub fn del(&mut self, key: &str) -> Result<()> {
        self.call("del", |c| c.del(key))
    }

    /// Add `by` to an integer value, returning the new value.
    pub fn incr(&mut self, key: &str, by: i64) -> Result<i64> {
        self.call("incr", |c| c.incr(key, by))
    }

    /// Key names in `(start, end]`. Empty bounds are open and a zero `limit` is unlimited.
    pub fn keys(&mut self, start: &str, end: &str, limit: u64) -> Result<Vec<String>> {
        self.call("keys", |c| c.keys(start, end, limit))
    }

    /// Like [`keys`](Self::keys), flattened as key, value pairs.
    pub fn scan(&mut self, start: &str, end: &str, limit: u64) -> Result<Vec<String>> {
        self.call("scan", |c| c.scan(start, end, limit))
    }

    /// Descending [`scan`](Self::scan) over `[end, start)`.
    pub fn rscan(&mut self, start: &str, end: &str, limit: u64) -> Result<Vec<String>> {
        self.call("rscan", |c| c.rscan(start, end, limit))
    }

    /// Key, value pairs for the keys that exist
    pub fn multi_get(&mut self, keys: &[String]) -> Result<Vec<String>> {
        self.call("multi_get", |c| c.multi_get(keys))
    }

    /// Store every pair of `kvs`.
    pub fn multi_set(&mut self, kvs: &BTreeMap<String, String>) -> Result<()> {
        self.call("multi_set", |c| c.multi_set(kvs))
    }

    /// Delete every key in `keys`.
    pub fn multi_del(&mut self, keys: &[String]) -> Result<()> {
        self.call("multi_del", |c| c.multi_del(keys))
    }

    /// Field `key` of hashmap `name`
    pub fn hget(&mut self, name: &str, key: &str) -> Result<String> {
        self.call("hget", |c| c.hget(name, key))
    }

    /// Set field `key` of hashmap `name`.
    pub fn hset(&mut self, name: &str, key: &str, value: &str) -> Result<()> {
        self.call("hset", |c| c.hset(name, key, value))
    }

    /// Delete field `key` of hashmap `name`.
    pub fn hdel(&mut self, name: &str, key: &str) -> Result<()> {
        self.call("hdel", |c| c.hdel(name, key))
    }

    /// Add `by` to an integer field, returning the new value.
    pub fn hincr(&mut self, name: &str, key: &str, by: i64) -> Result<i64> {
        self.call("hincr", |c| c.hincr(name, key, by))
    }

    /// Number of fields in hashmap `name`
    pub fn hsize(&mut self, name: &str) -> Result<i64> {
        self.call("hsize", |c| c.hsize(name))
    }

    /// Remove hashmap `name`, returning how many fields it had.
    pub fn hclear(&mut self, name: &str) -> Result<i64> {
        self.call("hclear", |c| c.hclear(name))
    }

    /// Field names in `(start, end]`, same bound rules as [`keys`](Self::keys).
    pub fn hkeys(&mut self, name: &str, start: &str, end: &str, limit: u64) -> Result<Vec<String>> {
        self.call("hkeys", |c| c.hkeys(name, start, end, limit))
    }

    /// Like [`hkeys`](Self::hkeys), flattened as field, value pairs.
    pub fn hscan(&mut self, name: &str, start: &str, end: &str, limit: u64) -> Result<Vec<String>> {
        self.call("hscan", |c| c.hscan(name, start, end, limit))
    }

    /// Descending [`hscan`](Self::hscan) over `[end, start)`.
    pub fn hrscan(&mut self, name: &str, start: &str, end: &str, limit: u64) -> Result<Vec<String>> {
        self.call("hrscan", |c| c.hrscan(name, start, end, limit))
    }

    /// Field, value pairs for the fields that exist
    pub fn multi_hget(&mut self, name: &str, keys: &[String]) -> Result<Vec<String>> {
        self.call("multi_hget", |c| c.multi_hget(name, keys))
    }

    /// Set every field of `kvs` in hashmap `name`.
    pub fn multi_hset(&mut self, name: &str, kvs: &BTreeMap<String, String>) -> Result<()> {
        self.call("multi_hset", |c| c.multi_hset(name, kvs))
    }

    /// Score of member `key` in sorted set `name`
    pub fn zget(&mut self, name: &str, key: &str) -> Result<i64> {
        self.call("zget", |c| c.zget(name, key))
    }

    /// Set the score of member `key`.
    pub fn zset(&mut self, name: &str, key: &str, score: i64) -> Result<()> {
        self.call("zset", |c| c.zset(name, key, score))
    }

    /// Remove member `key`.
    pub fn zdel(&mut self, name: &str, key: &str) -> Result<()> {
        self.call("zdel", |c| c.zdel(name, key))
    }

    /// Add `by` to a score, returning the new score.
    pub fn zincr(&mut self, name: &str, key: &str, by: i64) -> Result<i64> {
        self.call("zincr", |c| c.zincr(name, key, by))
    }

    /// Number of members in sorted set `name`
    pub fn zsize(&mut self, name: &str) -> Result<i64> {
        self.call("zsize", |c| c.zsize(name))
    }

    /// Remove sorted set `name`, returning how many members it had.
    pub fn zclear(&mut self, name: &str) -> Result<i64> {
        self.call("zclear", |c| c.zclear(name))
    }

    /// Zero-based position in ascending (score, member) order
    pub fn zrank(&mut self, name: &str, key: &str) -> Result<i64> {
        self.call("zrank", |c| c.zrank(name, key))
    }

    /// Zero-based position in descending order
    pub fn zrrank(&mut self, name: &str, key: &str) -> Result<i64> {
        self.call("zrrank", |c| c.zrrank(name, key))
    }

    /// Member, score pairs from `offset`, ascending.
    pub fn zrange(&mut self, name: &str, offset: u64, limit: u64) -> Result<Vec<String>> {
        self.call("zrange", |c| c.zrange(name, offset, limit))
    }

    /// Member, score pairs from `offset`, descending.
    pub fn zrrange(&mut self, name: &str, offset: u64, limit: u64) -> Result<Vec<String>> {
        self.call("zrrange", |c| c.zrrange(name, offset, limit))
    }

    /// Members with scores in the given range, resuming after `key_start` within the starting score.
    pub fn zkeys(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> Result<Vec<String>> {
        self.call("zkeys", |c| c.zkeys(name, key_start, score_start, score_end, limit))
    }

    /// Like [`zkeys`](Self::zkeys), flattened as member, score pairs.
    pub fn zscan(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> Result<Vec<String>> {
        self.call("zscan", |c| c.zscan(name, key_start, score_start, score_end, limit))
    }

    /// Descending [`zscan`](Self::zscan).
    pub fn zrscan(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> Result<Vec<String>> {
        self.call("zrscan", |c| c.zrscan(name, key_start, score_start, score_end, limit))
    }

    /// Member, score pairs for the members that exist
    pub fn multi_zget(&mut self, name: &str, keys: &[String]) -> Result<Vec<String>> {
        self.call("multi_zget", |c| c.multi_zget(name, keys))
    }

    /// Set every member score in `scores`.
    pub fn multi_zset(&mut self, name: &str, scores: &BTreeMap<String, i64>) -> Result<()> {
        self.call("multi_zset", |c| c.multi_zset(name, scores))
    }

    /// Remove every member in `keys`.
    pub fn multi_zdel(&mut self, name: &str, keys: &[String]) -> Result<()> {
        self.call("multi_zdel", |c| c.multi_zdel(name, keys))
    }

    /// Append `item` to the back of queue `name`.
    pub fn qpush(&mut self, name: &str, item: &str) -> Result<()> {
        self.call("qpush", |c| c.qpush(name, item))
    }

    /// Remove and return the front item.
    pub fn qpop(&mut self, name: &str) -> Result<String> {
        self.call("qpop", |c| c.qpop(name))
    }

    /// Items from `begin` to `end` inclusive; negative indexes count from the back.
    pub fn qslice(&mut self, name: &str, begin: i64, end: i64) -> Result<Vec<String>> {
        self.call("qslice", |c| c.qslice(name, begin, end))
    }

    /// Remove queue `name`, returning how many items it had.
    pub fn qclear(&mut self, name: &str) -> Result<i64> {
        self.call("qclear", |c| c.qclear(name))
    }

    /// Expire `key` after `ttl` seconds.
    pub fn expire(&mut self, key: &str, ttl: i64) -> Result<()> {
        self.call("expire", |c| c.expire(key, ttl))
    }

    /// Seconds until `key` expires, `-1` when it has no TTL.
    pub fn ttl(&mut self, key: &str) -> Result<i64> {
        self.call("ttl", |c| c.ttl(key))
    }

    /// Delete every key one by one.
    ///
    /// Not atomic: stops at the first failed delete and returns that error,
    /// leaving the keys deleted so far gone. Returns the number deleted.
    pub fn flushdb(&mut self) -> Result<usize> {
        let keys = self.keys("", "", 0)?;
        for (deleted, key) in keys.iter().enumerate() {
            if let Err(e) = self.del(key) {
                warn!(
                    target: "kvbridge::conn",
                    backend = Backend::Ssdb.name(),
                    key = %key,
                    deleted,
                    remaining = keys.len() - deleted,
                    error = %e,
                    "Flush stopped at a failed delete"
                );
                return Err(e);
            }
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssdb::memory::MemoryConnector;

    fn connected(connector: &MemoryConnector) -> SsdbRaw {
        let mut raw = SsdbRaw::new(Arc::new(connector.clone()), SsdbConfig::default());
        raw.connect().unwrap();
        raw
    }

    #[test]
    fn test_native_failure_is_wire_error() {
        let mem = MemoryConnector::new();
        let mut raw = connected(&mem);
        match raw.get("missing") {
            Err(Error::WireProtocol { operation, detail }) => {
                assert_eq!(operation, "get");
                assert_eq!(detail, "not_found");
            }
            other => panic!("Expected WireProtocol, got {:?}", other),
        }
    }

    #[test]
    fn test_disconnected_call_is_precondition_violation() {
        let mut raw = SsdbRaw::new(Arc::new(MemoryConnector::new()), SsdbConfig::default());
        assert!(raw.set("a", "1").unwrap_err().is_precondition_violation());
        assert!(raw.help(None).unwrap_err().is_precondition_violation());
    }

    #[test]
    fn test_unreachable_host() {
        let mem = MemoryConnector::new();
        mem.set_unreachable(true);
        let mut raw = SsdbRaw::new(Arc::new(mem), SsdbConfig::default());
        assert!(matches!(raw.connect(), Err(Error::Connection { .. })));
        assert!(!raw.is_connected());
    }

    #[test]
    fn test_password_sent_at_connect() {
        let mem = MemoryConnector::new().with_password("secret");
        let mut config = SsdbConfig::default();
        config.password = Some("secret".to_string());
        let mut raw = SsdbRaw::new(Arc::new(mem.clone()), config);
        raw.connect().unwrap();
        raw.set("a", "1").unwrap();

        let mut unauthenticated = SsdbRaw::new(Arc::new(mem.clone()), SsdbConfig::default());
        unauthenticated.connect().unwrap();
        assert_eq!(
            unauthenticated.get("a").unwrap_err(),
            Error::wire("get", "noauth")
        );

        let mut wrong = SsdbConfig::default();
        wrong.password = Some("nope".to_string());
        let mut raw = SsdbRaw::new(Arc::new(mem), wrong);
        assert!(matches!(raw.connect(), Err(Error::Connection { .. })));
    }

    #[test]
    fn test_info_parses_stats() {
        let mem = MemoryConnector::new();
        let mut raw = connected(&mem);
        raw.set("a", "1").unwrap();
        let info = raw.info("").unwrap();
        assert_eq!(info.version, "1.9.2");
        assert_eq!(info.links, 1);
        assert_eq!(info.dbsize, 1);
        assert!(info.to_string().starts_with("version:1.9.2\n"));
    }

    #[test]
    fn test_info_rejects_malformed_pairs() {
        let pairs = vec!["links".to_string(), "many".to_string()];
        assert!(matches!(ServerInfo::from_pairs(&pairs), Err(Error::WireProtocol { .. })));
        let odd = vec!["version".to_string()];
        assert!(ServerInfo::from_pairs(&odd).is_err());
        let named = vec!["ssdb-server".to_string(), "version".to_string(), "1.0".to_string()];
        assert_eq!(ServerInfo::from_pairs(&named).unwrap().version, "1.0");
    }

    #[test]
    fn test_help_not_supported() {
        let mem = MemoryConnector::new();
        let mut raw = connected(&mem);
        assert!(raw.help(Some("get")).unwrap_err().is_not_supported());
    }

    #[test]
    fn test_flushdb_stops_at_first_failure() {
        let mem = MemoryConnector::new();
        let mut raw = connected(&mem);
        for k in ["a", "b", "c"] {
            raw.set(k, k).unwrap();
        }
        mem.fail_on("del", "b");
        let err = raw.flushdb().unwrap_err();
        assert_eq!(err, Error::wire("del", "error"));
        assert!(!mem.contains_key("a"));
        assert!(mem.contains_key("b"));

        mem.clear_faults();
        assert_eq!(raw.flushdb().unwrap(), 2);
        assert_eq!(mem.key_count(), 0);
    }
}
