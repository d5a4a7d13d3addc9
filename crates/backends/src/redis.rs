//! Redis key translation.

use kvbridge_command::{ArgShape, CapabilitySet, CommandIndex, CommandInfo, CommandTable, KeyTranslator};
use kvbridge_core::{Error, NDbKValue, NDbPSChannel, NKey, Result, Ttl, Value, ValueType};

use crate::backend::Backend;
use crate::render::{line, utf8};

fn commands() -> Vec<CommandInfo> {
    use ArgShape::{Any, Integer};
    vec![
        CommandInfo::new("CLIENT LIST", 0, Some(0)).summary("List client connections").since("2.4.0"),
        CommandInfo::new("CLIENT KILL", 1, None).params("<ip:port>").since("2.4.0"),
        CommandInfo::new("CLIENT GETNAME", 0, Some(0)).since("2.6.9"),
        CommandInfo::new("CLIENT SETNAME", 1, Some(1)).params("<connection-name>").since("2.6.9"),
        CommandInfo::new("CONFIG GET", 1, Some(1)).params("<parameter>").since("2.0.0"),
        CommandInfo::new("CONFIG SET", 2, Some(2)).params("<parameter> <value>").since("2.0.0"),
        CommandInfo::new("CONFIG RESETSTAT", 0, Some(0)).since("2.0.0"),
        CommandInfo::new("APPEND", 2, Some(2)).params("<key> <value>").since("2.0.0"),
        CommandInfo::new("DBSIZE", 0, Some(0)).summary("Return the number of keys in the selected database"),
        CommandInfo::new("DEL", 1, None).params("<key> [key ...]").summary("Delete a key"),
        CommandInfo::new("EXISTS", 1, None).params("<key> [key ...]"),
        CommandInfo::new("EXPIRE", 2, Some(2))
            .params("<key> <seconds>")
            .shapes(&[Any, Integer])
            .summary("Set a key's time to live in seconds"),
        CommandInfo::new("FLUSHDB", 0, Some(0)).summary("Remove all keys from the current database"),
        CommandInfo::new("GET", 1, Some(1))
            .params("<key>")
            .summary("Get the value of a key")
            .load_key(),
        CommandInfo::new("HDEL", 2, None).params("<key> <field> [field ...]"),
        CommandInfo::new("HGET", 2, Some(2)).params("<key> <field>"),
        CommandInfo::new("HGETALL", 1, Some(1))
            .params("<key>")
            .summary("Get all the fields and values in a hash")
            .load_key(),
        CommandInfo::new("HMSET", 3, None).params("<key> <field> <value> [field value ...]").paired_from(1),
        CommandInfo::new("HSET", 3, Some(3)).params("<key> <field> <value>"),
        CommandInfo::new("INCR", 1, Some(1)).params("<key>"),
        CommandInfo::new("INCRBY", 2, Some(2)).params("<key> <increment>").shapes(&[Any, Integer]),
        CommandInfo::new("INFO", 0, Some(1)).params("[section]"),
        CommandInfo::new("KEYS", 1, Some(1)).params("<pattern>"),
        CommandInfo::new("LPUSH", 2, None).params("<key> <value> [value ...]"),
        CommandInfo::new("LRANGE", 3, Some(3))
            .params("<key> <start> <stop>")
            .shapes(&[Any, Integer, Integer])
            .load_key(),
        CommandInfo::new("PERSIST", 1, Some(1)).params("<key>").summary("Remove the expiration from a key"),
        CommandInfo::new("PING", 0, Some(1)),
        CommandInfo::new("PUBLISH", 2, Some(2)).params("<channel> <message>"),
        CommandInfo::new("RENAME", 2, Some(2)).params("<key> <newkey>"),
        CommandInfo::new("RPUSH", 2, None).params("<key> <value> [value ...]"),
        CommandInfo::new("SADD", 2, None).params("<key> <member> [member ...]"),
        CommandInfo::new("SCAN", 1, Some(5)).params("<cursor> [MATCH pattern] [COUNT count]"),
        CommandInfo::new("SELECT", 1, Some(1)).params("<index>"),
        CommandInfo::new("SET", 2, Some(2)).params("<key> <value>").summary("Set the string value of a key"),
        CommandInfo::new("SMEMBERS", 1, Some(1)).params("<key>").load_key(),
        CommandInfo::new("SUBSCRIBE", 1, None).params("<channel> [channel ...]"),
        CommandInfo::new("TTL", 1, Some(1)).params("<key>").summary("Get the time to live for a key"),
        CommandInfo::new("TYPE", 1, Some(1)).params("<key>"),
        CommandInfo::new("ZADD", 3, None).params("<key> <score> <member> [score member ...]").paired_from(1),
        CommandInfo::new("ZRANGE", 3, Some(4))
            .params("<key> <start> <stop> [WITHSCORES]")
            .shapes(&[Any, Integer, Integer])
            .load_key(),
    ]
}

/// Renders key operations as Redis commands.
pub struct RedisTranslator {
    table: CommandTable,
}

impl RedisTranslator {
    /// Translator over the Redis command table
    pub fn new() -> Result<Self> {
        Ok(Self {
            table: CommandTable::from_infos(commands())?,
        })
    }
}

impl KeyTranslator for RedisTranslator {
    fn backend_name(&self) -> &'static str {
        Backend::Redis.name()
    }

    fn capabilities(&self) -> CapabilitySet {
        Backend::Redis.capabilities()
    }

    fn commands(&self) -> &dyn CommandIndex {
        &self.table
    }

    fn create_key_impl(&self, key: &NDbKValue) -> Result<String> {
        let name = key.key_string().to_string();
        let tokens = match key.value() {
            Value::Null => return Err(Error::invalid_argument("cannot store a null value")),
            Value::Array(items) => {
                let mut t = vec!["RPUSH".to_string(), name];
                t.extend(items.iter().map(Value::to_display_string));
                t
            }
            Value::Set(members) => {
                let mut t = vec!["SADD".to_string(), name];
                t.extend(members.iter().map(Value::to_display_string));
                t
            }
            Value::ZSet(zset) => {
                let mut t = vec!["ZADD".to_string(), name];
                for (member, score) in zset.iter() {
                    t.push(score.to_string());
                    t.push(utf8(member));
                }
                t
            }
            Value::Hash(hash) => {
                let mut t = vec!["HMSET".to_string(), name];
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
            ValueType::Array => line(&["LRANGE", name, "0", "-1"]),
            ValueType::Set => line(&["SMEMBERS", name]),
            ValueType::ZSet => line(&["ZRANGE", name, "0", "-1", "WITHSCORES"]),
            ValueType::Hash => line(&["HGETALL", name]),
            _ => line(&["GET", name]),
        }
    }

    fn delete_key_impl(&self, key: &NKey) -> Result<String> {
        line(&["DEL", key.name()])
    }

    fn rename_key_impl(&self, key: &NKey, new_name: &str) -> Result<String> {
        line(&["RENAME", key.name(), new_name])
    }

    fn change_key_ttl_impl(&self, key: &NKey, ttl: Ttl) -> Result<String> {
        match ttl {
            Ttl::Seconds(secs) => line(&["EXPIRE", key.name(), &secs.to_string()]),
            _ => line(&["PERSIST", key.name()]),
        }
    }

    fn load_key_ttl_impl(&self, key: &NKey) -> Result<String> {
        line(&["TTL", key.name()])
    }

    fn publish_impl(&self, channel: &NDbPSChannel, message: &str) -> Result<String> {
        line(&["PUBLISH", channel.name(), message])
    }

    fn subscribe_impl(&self, channel: &NDbPSChannel) -> Result<String> {
        line(&["SUBSCRIBE", channel.name()])
    }
}
