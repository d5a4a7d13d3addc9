//! SSDB key translation.
//!
//! Lists and sets are stored as queues, sorted sets with integral scores
//! and hashes as hashmaps. Key operations render lines for the same command
//! table the SSDB handlers are bound to.

use kvbridge_command::{CapabilitySet, CommandIndex, CommandTable, KeyTranslator};
use kvbridge_core::{Error, NDbKValue, NKey, Result, Ttl, Value, ValueType};

use super::handlers::command_table;
use crate::backend::Backend;
use crate::render::{line, utf8};

/// Renders key operations as SSDB commands.
pub struct SsdbTranslator {
    table: CommandTable,
}

impl SsdbTranslator {
    /// Translator over the SSDB handler table
    pub fn new() -> Result<Self> {
        Ok(Self {
            table: command_table()?.map_handlers(|_| ()),
        })
    }
}

impl KeyTranslator for SsdbTranslator {
    fn backend_name(&self) -> &'static str {
        Backend::Ssdb.name()
    }

    fn capabilities(&self) -> CapabilitySet {
        Backend::Ssdb.capabilities()
    }

    fn commands(&self) -> &dyn CommandIndex {
        &self.table
    }

    fn create_key_impl(&self, key: &NDbKValue) -> Result<String> {
        let name = key.key_string().to_string();
        let tokens = match key.value() {
            Value::Null => return Err(Error::invalid_argument("cannot store a null value")),
            Value::Array(items) => {
                let mut t = vec!["QPUSH".to_string(), name];
                t.extend(items.iter().map(Value::to_display_string));
                t
            }
            Value::Set(members) => {
                let mut t = vec!["QPUSH".to_string(), name];
                t.extend(members.iter().map(Value::to_display_string));
                t
            }
            Value::ZSet(zset) => {
                let mut t = vec!["MULTI_ZSET".to_string(), name];
                for (member, score) in zset.iter() {
                    if score.fract() != 0.0 || !score.is_finite() {
                        return Err(Error::invalid_argument(format!(
                            "score {} of '{}' is not an integer",
                            score,
                            utf8(member)
                        )));
                    }
                    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
                    if score < i64::MIN as f64 || score >= i64::MAX as f64 {
                        return Err(Error::invalid_argument(format!(
                            "score {} of '{}' is outside the 64-bit integer range",
                            score,
                            utf8(member)
                        )));
                    }
                    t.push(utf8(member));
                    t.push((score as i64).to_string());
                }
                t
            }
            Value::Hash(hash) => {
                let mut t = vec!["MULTI_HSET".to_string(), name];
                for (field, value) in hash.iter() {
                    t.push(utf8(field));
                    t.push(value.to_display_string());
                }
                t
            }
            scalar => vec!["SET".to_string(), name, scalar.to_display_string()],
        };
        if tokens.len() == 2 {
            return Err(Error::invalid_argument(format!("'{}' has no elements to store", key.key_string())));
        }
        line(&tokens)
    }

    fn load_key_impl(&self, key: &NKey, value_type: ValueType) -> Result<String> {
        let name = key.name();
        match value_type {
            ValueType::Array | ValueType::Set => line(&["QSLICE", name, "0", "-1"]),
            ValueType::ZSet => line(&["ZRANGE", name, "0", "0"]),
            ValueType::Hash => line(&["HSCAN", name, "", "", "0"]),
            _ => line(&["GET", name]),
        }
    }

    fn delete_key_impl(&self, key: &NKey) -> Result<String> {
        line(&["DEL", key.name()])
    }

    /// SSDB cannot drop a TTL once set.
    fn change_key_ttl_impl(&self, key: &NKey, ttl: Ttl) -> Result<String> {
        match ttl {
            Ttl::Seconds(secs) => line(&["EXPIRE", key.name(), &secs.to_string()]),
            other => Err(Error::invalid_argument(format!(
                "{:?} TTL cannot be applied to '{}'",
                other,
                key.name()
            ))),
        }
    }

    fn load_key_ttl_impl(&self, key: &NKey) -> Result<String> {
        line(&["TTL", key.name()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbridge_command::{tokenize, KeyOperations};
    use kvbridge_core::{HashValue, ZSetValue};

    fn t() -> SsdbTranslator {
        SsdbTranslator::new().unwrap()
    }

    #[test]
    fn test_create_by_type() {
        let t = t();
        assert_eq!(t.create_key_command(&NDbKValue::new("k", Value::from("v"))).unwrap(), "SET k v");

        let list = NDbKValue::new("q", Value::Array(vec!["a".into(), "b".into()]));
        assert_eq!(t.create_key_command(&list).unwrap(), "QPUSH q a b");

        let mut zset = ZSetValue::new();
        zset.insert("m", 4.0);
        assert_eq!(t.create_key_command(&NDbKValue::new("z", zset.into())).unwrap(), "MULTI_ZSET z m 4");

        let mut hash = HashValue::new();
        hash.insert("f", Value::from("v"));
        assert_eq!(t.create_key_command(&NDbKValue::new("h", hash.into())).unwrap(), "MULTI_HSET h f v");
    }

    #[test]
    fn test_fractional_score_rejected() {
        let mut zset = ZSetValue::new();
        zset.insert("m", 1.5);
        let err = t().create_key_command(&NDbKValue::new("z", zset.into())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        for score in [1e20, -1e20, 9_223_372_036_854_775_808.0] {
            let mut zset = ZSetValue::new();
            zset.insert("m", score);
            let err = t().create_key_command(&NDbKValue::new("z", zset.into())).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument { .. }), "{}", score);
        }

        let mut zset = ZSetValue::new();
        zset.insert("m", -9_223_372_036_854_775_808.0);
        assert_eq!(
            t().create_key_command(&NDbKValue::new("z", zset.into())).unwrap(),
            "MULTI_ZSET z m -9223372036854775808"
        );
    }

    #[test]
    fn test_load_by_type() {
        let t = t();
        let k = NKey::new("k");
        assert_eq!(t.load_key_command(&k, ValueType::String).unwrap(), "GET k");
        assert_eq!(tokenize(&t.load_key_command(&k, ValueType::Set).unwrap()).unwrap(), vec!["QSLICE", "k", "0", "-1"]);
        assert_eq!(t.load_key_command(&k, ValueType::ZSet).unwrap(), "ZRANGE k 0 0");
        assert_eq!(tokenize(&t.load_key_command(&k, ValueType::Hash).unwrap()).unwrap(), vec!["HSCAN", "k", "", "", "0"]);
    }

    #[test]
    fn test_generated_lines_validate() {
        let t = t();
        let k = NKey::new("k");
        let lines = [
            t.load_key_command(&k, ValueType::Array).unwrap(),
            t.load_key_command(&k, ValueType::Hash).unwrap(),
            t.delete_key_command(&k).unwrap(),
            t.change_key_ttl_command(&k, Ttl::Seconds(10)).unwrap(),
            t.load_key_ttl_command(&k).unwrap(),
            t.flush_db_command().unwrap(),
        ];
        for l in &lines {
            assert!(t.test_command_line(l).is_ok(), "{}", l);
        }
    }

    #[test]
    fn test_ttl_and_unsupported() {
        let t = t();
        let k = NKey::new("k");
        assert!(matches!(
            t.change_key_ttl_command(&k, Ttl::Persistent),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(t.rename_key_command(&k, "j").unwrap_err().is_not_supported());
        assert!(t.select_db_command("1").unwrap_err().is_not_supported());
    }

    #[test]
    fn test_load_key_detection() {
        let t = t();
        assert_eq!(t.is_load_key_command("GET mykey").as_deref(), Some("mykey"));
        assert_eq!(t.is_load_key_command("QSLICE q 0 -1").as_deref(), Some("q"));
        assert_eq!(t.is_load_key_command("SET a b"), None);
        assert_eq!(t.is_load_key_command("GET"), None);
    }
}
