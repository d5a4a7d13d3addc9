//! In-process implementation of the queue/KV driver contract.
//!
//! Every client dialed from one [`MemoryConnector`] shares the same store,
//! so a test can write through one client and inspect through the
//! connector. Faults can be injected per operation and key to exercise
//! native-failure paths.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use kvbridge_connection::HostAndPort;
use parking_lot::Mutex;

use super::driver::{NativeResult, QueueKvClient, QueueKvConnector, Status};

/// Key that matches any key in [`MemoryConnector::fail_on`]
pub const ANY_KEY: &str = "*";

const SERVER_VERSION: &str = "1.9.2";

#[derive(Debug, Default)]
struct Store {
    kv: BTreeMap<String, String>,
    ttls: BTreeMap<String, i64>,
    hashes: BTreeMap<String, BTreeMap<String, String>>,
    zsets: BTreeMap<String, BTreeMap<String, i64>>,
    queues: BTreeMap<String, VecDeque<String>>,
    password: Option<String>,
    unreachable: bool,
    faults: HashSet<(String, String)>,
    total_calls: u64,
    links: u32,
}

impl Store {
    fn faulty(&self, operation: &str, key: &str) -> bool {
        self.faults.contains(&(operation.to_string(), key.to_string()))
            || self.faults.contains(&(operation.to_string(), ANY_KEY.to_string()))
    }
}

/// Shared in-process server; dials [`MemoryClient`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: Arc<Mutex<Store>>,
}

impl MemoryConnector {
    /// An empty store without a password
    pub fn new() -> Self {
        Self::default()
    }

    /// Require clients to `auth` with `password` before any other call.
    pub fn with_password(self, password: impl Into<String>) -> Self {
        self.store.lock().password = Some(password.into());
        self
    }

    /// Make subsequent dials fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.store.lock().unreachable = unreachable;
    }

    /// Make `operation` fail with `error` for `key` ([`ANY_KEY`] for all keys).
    pub fn fail_on(&self, operation: &str, key: &str) {
        self.store
            .lock()
            .faults
            .insert((operation.to_string(), key.to_string()));
    }

    /// Remove every injected fault.
    pub fn clear_faults(&self) {
        self.store.lock().faults.clear();
    }

    /// Whether plain `key` is stored
    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().kv.contains_key(key)
    }

    /// Stored value of plain `key`
    pub fn value(&self, key: &str) -> Option<String> {
        self.store.lock().kv.get(key).cloned()
    }

    /// Number of plain keys
    pub fn key_count(&self) -> usize {
        self.store.lock().kv.len()
    }

    /// Number of live clients
    pub fn links(&self) -> u32 {
        self.store.lock().links
    }
}

impl QueueKvConnector for MemoryConnector {
    fn dial(&self, _host: &HostAndPort) -> NativeResult<Box<dyn QueueKvClient>> {
        let mut store = self.store.lock();
        if store.unreachable {
            return Err(Status::new("connection refused"));
        }
        store.links += 1;
        let authed = store.password.is_none();
        Ok(Box::new(MemoryClient {
            store: Arc::clone(&self.store),
            authed,
        }))
    }
}

/// A client connected to a [`MemoryConnector`].
#[derive(Debug)]
pub struct MemoryClient {
    store: Arc<Mutex<Store>>,
    authed: bool,
}

impl Drop for MemoryClient {
    fn drop(&mut self) {
        let mut store = self.store.lock();
        store.links = store.links.saturating_sub(1);
    }
}

fn limit_of(limit: u64) -> usize {
    if limit == 0 {
        usize::MAX
    } else {
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

/// Names in `(start, end]`, ascending.
fn forward<'a, V>(map: &'a BTreeMap<String, V>, start: &'a str, end: &'a str, limit: u64) -> impl Iterator<Item = (&'a String, &'a V)> {
    map.iter()
        .filter(move |(k, _)| (start.is_empty() || k.as_str() > start) && (end.is_empty() || k.as_str() <= end))
        .take(limit_of(limit))
}

/// Names in `[end, start)`, descending.
fn backward<'a, V>(map: &'a BTreeMap<String, V>, start: &'a str, end: &'a str, limit: u64) -> impl Iterator<Item = (&'a String, &'a V)> {
    map.iter()
        .rev()
        .filter(move |(k, _)| (start.is_empty() || k.as_str() < start) && (end.is_empty() || k.as_str() >= end))
        .take(limit_of(limit))
}

fn flatten<'a, V: ToString + 'a>(pairs: impl Iterator<Item = (&'a String, &'a V)>) -> Vec<String> {
    pairs.flat_map(|(k, v)| [k.clone(), v.to_string()]).collect()
}

/// Sorted-set entries ordered by score, then member.
fn ranked(zset: &BTreeMap<String, i64>) -> Vec<(&String, i64)> {
    let mut entries: Vec<(&String, i64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
    entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    entries
}

fn score_window(
    entries: Vec<(&String, i64)>,
    key_start: &str,
    score_start: Option<i64>,
    score_end: Option<i64>,
    reverse: bool,
) -> Vec<(String, i64)> {
    let ordered: Vec<(&String, i64)> = if reverse {
        entries.into_iter().rev().collect()
    } else {
        entries
    };
    ordered
        .into_iter()
        .filter(|(member, score)| {
            let (low, high) = if reverse { (score_end, score_start) } else { (score_start, score_end) };
            let in_range = low.map_or(true, |l| *score >= l) && high.map_or(true, |h| *score <= h);
            // Within the starting score, resume after `key_start`.
            let after_key = key_start.is_empty()
                || score_start != Some(*score)
                || if reverse { member.as_str() < key_start } else { member.as_str() > key_start };
            in_range && after_key
        })
        .map(|(m, s)| (m.clone(), s))
        .collect()
}

impl MemoryClient {
    fn call<R>(&mut self, operation: &str, key: &str, f: impl FnOnce(&mut Store) -> NativeResult<R>) -> NativeResult<R> {
        let mut store = self.store.lock();
        store.total_calls += 1;
        if !self.authed {
            return Err(Status::new(Status::NO_AUTH));
        }
        if store.faulty(operation, key) {
            return Err(Status::error());
        }
        f(&mut store)
    }

    fn zwindow(
        &mut self,
        operation: &str,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
        reverse: bool,
    ) -> NativeResult<Vec<(String, i64)>> {
        self.call(operation, name, |s| {
            let entries = s.zsets.get(name).map(ranked).unwrap_or_default();
            let mut window = score_window(entries, key_start, score_start, score_end, reverse);
            window.truncate(limit_of(limit));
            Ok(window)
        })
    }
}

impl QueueKvClient for MemoryClient {
    fn info(&mut self, _section: &str) -> NativeResult<Vec<String>> {
        self.call("info", "", |s| {
            Ok(vec![
                "version".to_string(),
                SERVER_VERSION.to_string(),
                "links".to_string(),
                s.links.to_string(),
                "total_calls".to_string(),
                s.total_calls.to_string(),
                "dbsize".to_string(),
                s.kv.len().to_string(),
                "binlogs".to_string(),
                "capacity: 0".to_string(),
            ])
        })
    }

    fn dbsize(&mut self) -> NativeResult<i64> {
        self.call("dbsize", "", |s| Ok(s.kv.len() as i64))
    }

    fn auth(&mut self, password: &str) -> NativeResult<()> {
        let mut store = self.store.lock();
        store.total_calls += 1;
        match &store.password {
            Some(expected) if expected != password => Err(Status::error()),
            _ => {
                self.authed = true;
                Ok(())
            }
        }
    }

    fn get(&mut self, key: &str) -> NativeResult<String> {
        self.call("get", key, |s| s.kv.get(key).cloned().ok_or_else(Status::not_found))
    }

    fn set(&mut self, key: &str, value: &str) -> NativeResult<()> {
        self.call("set", key, |s| {
            s.kv.insert(key.to_string(), value.to_string());
            s.ttls.remove(key);
            Ok(())
        })
    }

    fn setx(&mut self, key: &str, value: &str, ttl: i64) -> NativeResult<()> {
        self.call("setx", key, |s| {
            s.kv.insert(key.to_string(), value.to_string());
            s.ttls.insert(key.to_string(), ttl);
            Ok(())
        })
    }

    fn del(&mut self, key: &str) -> NativeResult<()> {
        self.call("del", key, |s| {
            s.kv.remove(key);
            s.ttls.remove(key);
            Ok(())
        })
    }

    fn incr(&mut self, key: &str, by: i64) -> NativeResult<i64> {
        self.call("incr", key, |s| {
            let current = match s.kv.get(key) {
                Some(v) => v.parse::<i64>().map_err(|_| Status::error())?,
                None => 0,
            };
            let next = current.checked_add(by).ok_or_else(Status::error)?;
            s.kv.insert(key.to_string(), next.to_string());
            Ok(next)
        })
    }

    fn keys(&mut self, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>> {
        self.call("keys", start, |s| Ok(forward(&s.kv, start, end, limit).map(|(k, _)| k.clone()).collect()))
    }

    fn scan(&mut self, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>> {
        self.call("scan", start, |s| Ok(flatten(forward(&s.kv, start, end, limit))))
    }

    fn rscan(&mut self, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>> {
        self.call("rscan", start, |s| Ok(flatten(backward(&s.kv, start, end, limit))))
    }

    fn multi_get(&mut self, keys: &[String]) -> NativeResult<Vec<String>> {
        let first = keys.first().map(String::as_str).unwrap_or_default();
        self.call("multi_get", first, |s| {
            Ok(keys
                .iter()
                .filter_map(|k| s.kv.get(k).map(|v| [k.clone(), v.clone()]))
                .flatten()
                .collect())
        })
    }

    fn multi_set(&mut self, kvs: &BTreeMap<String, String>) -> NativeResult<()> {
        let first = kvs.keys().next().map(String::as_str).unwrap_or_default();
        self.call("multi_set", first, |s| {
            for (k, v) in kvs {
                s.kv.insert(k.clone(), v.clone());
                s.ttls.remove(k);
            }
            Ok(())
        })
    }

    fn multi_del(&mut self, keys: &[String]) -> NativeResult<()> {
        let first = keys.first().map(String::as_str).unwrap_or_default();
        self.call("multi_del", first, |s| {
            for k in keys {
                s.kv.remove(k);
                s.ttls.remove(k);
            }
            Ok(())
        })
    }

    fn hget(&mut self, name: &str, key: &str) -> NativeResult<String> {
        self.call("hget", name, |s| {
            s.hashes
                .get(name)
                .and_then(|h| h.get(key))
                .cloned()
                .ok_or_else(Status::not_found)
        })
    }

    fn hset(&mut self, name: &str, key: &str, value: &str) -> NativeResult<()> {
        self.call("hset", name, |s| {
            s.hashes
                .entry(name.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn hdel(&mut self, name: &str, key: &str) -> NativeResult<()> {
        self.call("hdel", name, |s| {
            if let Some(h) = s.hashes.get_mut(name) {
                h.remove(key);
                if h.is_empty() {
                    s.hashes.remove(name);
                }
            }
            Ok(())
        })
    }

    fn hincr(&mut self, name: &str, key: &str, by: i64) -> NativeResult<i64> {
        self.call("hincr", name, |s| {
            let hash = s.hashes.entry(name.to_string()).or_default();
            let current = match hash.get(key) {
                Some(v) => v.parse::<i64>().map_err(|_| Status::error())?,
                None => 0,
            };
            let next = current.checked_add(by).ok_or_else(Status::error)?;
            hash.insert(key.to_string(), next.to_string());
            Ok(next)
        })
    }

    fn hsize(&mut self, name: &str) -> NativeResult<i64> {
        self.call("hsize", name, |s| Ok(s.hashes.get(name).map_or(0, |h| h.len() as i64)))
    }

    fn hclear(&mut self, name: &str) -> NativeResult<i64> {
        self.call("hclear", name, |s| Ok(s.hashes.remove(name).map_or(0, |h| h.len() as i64)))
    }

    fn hkeys(&mut self, name: &str, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>> {
        self.call("hkeys", name, |s| {
            Ok(s.hashes
                .get(name)
                .map(|h| forward(h, start, end, limit).map(|(k, _)| k.clone()).collect())
                .unwrap_or_default())
        })
    }

    fn hscan(&mut self, name: &str, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>> {
        self.call("hscan", name, |s| {
            Ok(s.hashes
                .get(name)
                .map(|h| flatten(forward(h, start, end, limit)))
                .unwrap_or_default())
        })
    }

    fn hrscan(&mut self, name: &str, start: &str, end: &str, limit: u64) -> NativeResult<Vec<String>> {
        self.call("hrscan", name, |s| {
            Ok(s.hashes
                .get(name)
                .map(|h| flatten(backward(h, start, end, limit)))
                .unwrap_or_default())
        })
    }

    fn multi_hget(&mut self, name: &str, keys: &[String]) -> NativeResult<Vec<String>> {
        self.call("multi_hget", name, |s| {
            let Some(hash) = s.hashes.get(name) else {
                return Ok(Vec::new());
            };
            Ok(keys
                .iter()
                .filter_map(|k| hash.get(k).map(|v| [k.clone(), v.clone()]))
                .flatten()
                .collect())
        })
    }

    fn multi_hset(&mut self, name: &str, kvs: &BTreeMap<String, String>) -> NativeResult<()> {
        self.call("multi_hset", name, |s| {
            let hash = s.hashes.entry(name.to_string()).or_default();
            hash.extend(kvs.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(())
        })
    }

    fn zget(&mut self, name: &str, key: &str) -> NativeResult<i64> {
        self.call("zget", name, |s| {
            s.zsets
                .get(name)
                .and_then(|z| z.get(key))
                .copied()
                .ok_or_else(Status::not_found)
        })
    }

    fn zset(&mut self, name: &str, key: &str, score: i64) -> NativeResult<()> {
        self.call("zset", name, |s| {
            s.zsets.entry(name.to_string()).or_default().insert(key.to_string(), score);
            Ok(())
        })
    }

    fn zdel(&mut self, name: &str, key: &str) -> NativeResult<()> {
        self.call("zdel", name, |s| {
            if let Some(z) = s.zsets.get_mut(name) {
                z.remove(key);
                if z.is_empty() {
                    s.zsets.remove(name);
                }
            }
            Ok(())
        })
    }

    fn zincr(&mut self, name: &str, key: &str, by: i64) -> NativeResult<i64> {
        self.call("zincr", name, |s| {
            let score = s.zsets.entry(name.to_string()).or_default().entry(key.to_string()).or_insert(0);
            *score = score.checked_add(by).ok_or_else(Status::error)?;
            Ok(*score)
        })
    }

    fn zsize(&mut self, name: &str) -> NativeResult<i64> {
        self.call("zsize", name, |s| Ok(s.zsets.get(name).map_or(0, |z| z.len() as i64)))
    }

    fn zclear(&mut self, name: &str) -> NativeResult<i64> {
        self.call("zclear", name, |s| Ok(s.zsets.remove(name).map_or(0, |z| z.len() as i64)))
    }

    fn zrank(&mut self, name: &str, key: &str) -> NativeResult<i64> {
        self.call("zrank", name, |s| {
            let entries = s.zsets.get(name).map(ranked).unwrap_or_default();
            entries
                .iter()
                .position(|(m, _)| m.as_str() == key)
                .map(|p| p as i64)
                .ok_or_else(Status::not_found)
        })
    }

    fn zrrank(&mut self, name: &str, key: &str) -> NativeResult<i64> {
        self.call("zrrank", name, |s| {
            let entries = s.zsets.get(name).map(ranked).unwrap_or_default();
            entries
                .iter()
                .rev()
                .position(|(m, _)| m.as_str() == key)
                .map(|p| p as i64)
                .ok_or_else(Status::not_found)
        })
    }

    fn zrange(&mut self, name: &str, offset: u64, limit: u64) -> NativeResult<Vec<String>> {
        self.call("zrange", name, |s| {
            let entries = s.zsets.get(name).map(ranked).unwrap_or_default();
            Ok(entries
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(limit_of(limit))
                .flat_map(|(m, sc)| [m.clone(), sc.to_string()])
                .collect())
        })
    }

    fn zrrange(&mut self, name: &str, offset: u64, limit: u64) -> NativeResult<Vec<String>> {
        self.call("zrrange", name, |s| {
            let entries = s.zsets.get(name).map(ranked).unwrap_or_default();
            Ok(entries
                .into_iter()
                .rev()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(limit_of(limit))
                .flat_map(|(m, sc)| [m.clone(), sc.to_string()])
                .collect())
        })
    }

    fn zkeys(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> NativeResult<Vec<String>> {
        let window = self.zwindow("zkeys", name, key_start, score_start, score_end, limit, false)?;
        Ok(window.into_iter().map(|(m, _)| m).collect())
    }

    fn zscan(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> NativeResult<Vec<String>> {
        let window = self.zwindow("zscan", name, key_start, score_start, score_end, limit, false)?;
        Ok(window.into_iter().flat_map(|(m, s)| [m, s.to_string()]).collect())
    }

    fn zrscan(
        &mut self,
        name: &str,
        key_start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u64,
    ) -> NativeResult<Vec<String>> {
        let window = self.zwindow("zrscan", name, key_start, score_start, score_end, limit, true)?;
        Ok(window.into_iter().flat_map(|(m, s)| [m, s.to_string()]).collect())
    }

    fn multi_zget(&mut self, name: &str, keys: &[String]) -> NativeResult<Vec<String>> {
        self.call("multi_zget", name, |s| {
            let Some(zset) = s.zsets.get(name) else {
                return Ok(Vec::new());
            };
            Ok(keys
                .iter()
                .filter_map(|k| zset.get(k).map(|score| [k.clone(), score.to_string()]))
                .flatten()
                .collect())
        })
    }

    fn multi_zset(&mut self, name: &str, scores: &BTreeMap<String, i64>) -> NativeResult<()> {
        self.call("multi_zset", name, |s| {
            let zset = s.zsets.entry(name.to_string()).or_default();
            zset.extend(scores.iter().map(|(k, v)| (k.clone(), *v)));
            Ok(())
        })
    }

    fn multi_zdel(&mut self, name: &str, keys: &[String]) -> NativeResult<()> {
        self.call("multi_zdel", name, |s| {
            if let Some(zset) = s.zsets.get_mut(name) {
                for k in keys {
                    zset.remove(k);
                }
                if zset.is_empty() {
                    s.zsets.remove(name);
                }
            }
            Ok(())
        })
    }

    fn qpush(&mut self, name: &str, item: &str) -> NativeResult<()> {
        self.call("qpush", name, |s| {
            s.queues.entry(name.to_string()).or_default().push_back(item.to_string());
            Ok(())
        })
    }

    fn qpop(&mut self, name: &str) -> NativeResult<String> {
        self.call("qpop", name, |s| {
            let queue = s.queues.get_mut(name).ok_or_else(Status::not_found)?;
            let item = queue.pop_front().ok_or_else(Status::not_found)?;
            if queue.is_empty() {
                s.queues.remove(name);
            }
            Ok(item)
        })
    }

    fn qslice(&mut self, name: &str, begin: i64, end: i64) -> NativeResult<Vec<String>> {
        self.call("qslice", name, |s| {
            let Some(queue) = s.queues.get(name) else {
                return Ok(Vec::new());
            };
            let len = queue.len() as i64;
            let normalize = |i: i64| if i < 0 { len + i } else { i };
            let (first, last) = (normalize(begin).max(0), normalize(end).min(len - 1));
            if first > last {
                return Ok(Vec::new());
            }
            Ok(queue
                .iter()
                .skip(first as usize)
                .take((last - first + 1) as usize)
                .cloned()
                .collect())
        })
    }

    fn qclear(&mut self, name: &str) -> NativeResult<i64> {
        self.call("qclear", name, |s| Ok(s.queues.remove(name).map_or(0, |q| q.len() as i64)))
    }

    fn expire(&mut self, key: &str, ttl: i64) -> NativeResult<()> {
        self.call("expire", key, |s| {
            if !s.kv.contains_key(key) {
                return Err(Status::not_found());
            }
            s.ttls.insert(key.to_string(), ttl);
            Ok(())
        })
    }

    fn ttl(&mut self, key: &str) -> NativeResult<i64> {
        self.call("ttl", key, |s| Ok(s.ttls.get(key).copied().unwrap_or(-1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(connector: &MemoryConnector) -> Box<dyn QueueKvClient> {
        connector.dial(&HostAndPort::local_host(8888)).unwrap()
    }

    #[test]
    fn test_key_ranges() {
        let c = MemoryConnector::new();
        let mut cl = client(&c);
        for k in ["a", "b", "c", "d"] {
            cl.set(k, k).unwrap();
        }
        assert_eq!(cl.keys("", "", 0).unwrap(), vec!["a", "b", "c", "d"]);
        assert_eq!(cl.keys("a", "c", 0).unwrap(), vec!["b", "c"]);
        assert_eq!(cl.keys("", "", 2).unwrap(), vec!["a", "b"]);
        assert_eq!(cl.rscan("d", "b", 0).unwrap(), vec!["c", "c", "b", "b"]);
        assert_eq!(cl.keys("d", "a", 0).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_fault_injection() {
        let c = MemoryConnector::new();
        let mut cl = client(&c);
        cl.set("b", "1").unwrap();
        c.fail_on("del", "b");
        assert_eq!(cl.del("b").unwrap_err().code(), "error");
        assert!(c.contains_key("b"));
        c.clear_faults();
        cl.del("b").unwrap();
        assert!(!c.contains_key("b"));
    }

    #[test]
    fn test_auth_required() {
        let c = MemoryConnector::new().with_password("pw");
        let mut cl = client(&c);
        assert_eq!(cl.get("x").unwrap_err().code(), Status::NO_AUTH);
        assert!(cl.auth("wrong").is_err());
        cl.auth("pw").unwrap();
        assert!(cl.get("x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_sorted_set_order() {
        let c = MemoryConnector::new();
        let mut cl = client(&c);
        cl.zset("z", "b", 2).unwrap();
        cl.zset("z", "a", 2).unwrap();
        cl.zset("z", "c", 1).unwrap();
        assert_eq!(cl.zrange("z", 0, 0).unwrap(), vec!["c", "1", "a", "2", "b", "2"]);
        assert_eq!(cl.zrank("z", "b").unwrap(), 2);
        assert_eq!(cl.zrrank("z", "b").unwrap(), 0);
        assert_eq!(cl.zkeys("z", "a", Some(2), None, 0).unwrap(), vec!["b"]);
        assert_eq!(cl.zrscan("z", "", Some(2), Some(1), 1).unwrap(), vec!["b", "2"]);
    }

    #[test]
    fn test_queue_slice() {
        let c = MemoryConnector::new();
        let mut cl = client(&c);
        for i in 0..5 {
            cl.qpush("q", &i.to_string()).unwrap();
        }
        assert_eq!(cl.qslice("q", 1, -2).unwrap(), vec!["1", "2", "3"]);
        assert_eq!(cl.qslice("q", 0, -1).unwrap().len(), 5);
        assert_eq!(cl.qpop("q").unwrap(), "0");
        assert_eq!(cl.qclear("q").unwrap(), 4);
        assert!(cl.qpop("q").unwrap_err().is_not_found());
    }

    #[test]
    fn test_links_follow_clients() {
        let c = MemoryConnector::new();
        let cl = client(&c);
        assert_eq!(c.links(), 1);
        drop(cl);
        assert_eq!(c.links(), 0);
        c.set_unreachable(true);
        assert!(c.dial(&HostAndPort::local_host(1)).is_err());
    }
}
