//! SSDB command table and the handlers bound to it.
//!
//! Each handler receives the arguments after the command name, already
//! checked against the descriptor's arity and shapes, calls one typed
//! [`SsdbRaw`] operation and attaches the reply to the output tree.

use std::collections::BTreeMap;
use std::str::FromStr;

use kvbridge_command::{ArgShape, CommandDescriptor, CommandInfo, CommandTable};
use kvbridge_connection::{CommandHandler, Handler};
use kvbridge_core::{Error, OutputNode, Result, Value};

use super::raw::SsdbRaw;

const STORED: &str = "STORED";
const DELETED: &str = "DELETED";
const OK: &str = "OK";

fn number<T: FromStr>(argv: &[String], pos: usize, what: &str) -> Result<T> {
    let arg = argv
        .get(pos)
        .ok_or_else(|| Error::invalid_argument(format!("missing {}", what)))?;
    arg.parse()
        .map_err(|_| Error::invalid_argument(format!("{} '{}' is not a valid number", what, arg)))
}

/// An empty score bound is open.
fn score_bound(arg: &str) -> Result<Option<i64>> {
    if arg.is_empty() {
        return Ok(None);
    }
    arg.parse()
        .map(Some)
        .map_err(|_| Error::invalid_argument(format!("score '{}' is not an integer", arg)))
}

fn pairs(argv: &[String]) -> BTreeMap<String, String> {
    argv.chunks(2)
        .filter_map(|pair| match pair {
            [k, v] => Some((k.clone(), v.clone())),
            _ => None,
        })
        .collect()
}

fn reply(raw: &SsdbRaw, out: &mut OutputNode, value: Value) {
    out.attach(OutputNode::leaf(value, raw.delimiter()));
}

fn reply_list(raw: &SsdbRaw, out: &mut OutputNode, items: Vec<String>) {
    let value = Value::Array(items.into_iter().map(Value::from).collect());
    out.attach(OutputNode::array(value, raw.delimiter()));
}

fn info(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let section = argv.first().map(String::as_str).unwrap_or_default();
    let stats = raw.info(section)?;
    reply(raw, out, Value::from(stats.to_string()));
    Ok(())
}

fn dbsize(raw: &mut SsdbRaw, _argv: &[String], out: &mut OutputNode) -> Result<()> {
    let size = raw.dbsize()?;
    reply(raw, out, Value::from(size));
    Ok(())
}

fn auth(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.auth(&argv[0])?;
    reply(raw, out, Value::from(OK));
    Ok(())
}

fn help(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let text = raw.help(argv.first().map(String::as_str))?;
    reply(raw, out, Value::from(text));
    Ok(())
}

// Success attaches nothing; the cleared store is the result.
fn flushdb(raw: &mut SsdbRaw, _argv: &[String], _out: &mut OutputNode) -> Result<()> {
    raw.flushdb()?;
    Ok(())
}

// ==================== Keys ====================

fn get(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let value = raw.get(&argv[0])?;
    reply(raw, out, Value::from(value));
    Ok(())
}

fn set(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.set(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn setx(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let ttl = number(argv, 2, "ttl")?;
    raw.setx(&argv[0], &argv[1], ttl)?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn del(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.del(&argv[0])?;
    reply(raw, out, Value::from(DELETED));
    Ok(())
}

fn incr(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let by = number(argv, 1, "increment")?;
    let result = raw.incr(&argv[0], by)?;
    reply(raw, out, Value::from(result));
    Ok(())
}

fn keys(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let limit = number(argv, 2, "limit")?;
    let found = raw.keys(&argv[0], &argv[1], limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn scan(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let limit = number(argv, 2, "limit")?;
    let found = raw.scan(&argv[0], &argv[1], limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn rscan(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let limit = number(argv, 2, "limit")?;
    let found = raw.rscan(&argv[0], &argv[1], limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn multi_get(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let found = raw.multi_get(argv)?;
    reply_list(raw, out, found);
    Ok(())
}

fn multi_set(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.multi_set(&pairs(argv))?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn multi_del(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.multi_del(argv)?;
    reply(raw, out, Value::from(DELETED));
    Ok(())
}

fn expire(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let ttl = number(argv, 1, "ttl")?;
    raw.expire(&argv[0], ttl)?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn ttl(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let remaining = raw.ttl(&argv[0])?;
    reply(raw, out, Value::from(remaining));
    Ok(())
}

// ==================== Hashes ====================

fn hget(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let value = raw.hget(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(value));
    Ok(())
}

fn hset(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.hset(&argv[0], &argv[1], &argv[2])?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn hdel(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.hdel(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(DELETED));
    Ok(())
}

fn hincr(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let by = number(argv, 2, "increment")?;
    let result = raw.hincr(&argv[0], &argv[1], by)?;
    reply(raw, out, Value::from(result));
    Ok(())
}

fn hsize(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let size = raw.hsize(&argv[0])?;
    reply(raw, out, Value::from(size));
    Ok(())
}

fn hclear(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let removed = raw.hclear(&argv[0])?;
    reply(raw, out, Value::from(removed));
    Ok(())
}

fn hkeys(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let limit = number(argv, 3, "limit")?;
    let found = raw.hkeys(&argv[0], &argv[1], &argv[2], limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn hscan(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let limit = number(argv, 3, "limit")?;
    let found = raw.hscan(&argv[0], &argv[1], &argv[2], limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn hrscan(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let limit = number(argv, 3, "limit")?;
    let found = raw.hrscan(&argv[0], &argv[1], &argv[2], limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn multi_hget(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let found = raw.multi_hget(&argv[0], &argv[1..])?;
    reply_list(raw, out, found);
    Ok(())
}

fn multi_hset(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.multi_hset(&argv[0], &pairs(&argv[1..]))?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

// ==================== Sorted sets ====================

fn zget(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let score = raw.zget(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(score));
    Ok(())
}

fn zset(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let score = number(argv, 2, "score")?;
    raw.zset(&argv[0], &argv[1], score)?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn zdel(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.zdel(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(DELETED));
    Ok(())
}

fn zincr(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let by = number(argv, 2, "increment")?;
    let result = raw.zincr(&argv[0], &argv[1], by)?;
    reply(raw, out, Value::from(result));
    Ok(())
}

fn zsize(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let size = raw.zsize(&argv[0])?;
    reply(raw, out, Value::from(size));
    Ok(())
}

fn zclear(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let removed = raw.zclear(&argv[0])?;
    reply(raw, out, Value::from(removed));
    Ok(())
}

fn zrank(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let rank = raw.zrank(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(rank));
    Ok(())
}

fn zrrank(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let rank = raw.zrrank(&argv[0], &argv[1])?;
    reply(raw, out, Value::from(rank));
    Ok(())
}

fn zrange(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let offset = number(argv, 1, "offset")?;
    let limit = number(argv, 2, "limit")?;
    let found = raw.zrange(&argv[0], offset, limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn zrrange(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let offset = number(argv, 1, "offset")?;
    let limit = number(argv, 2, "limit")?;
    let found = raw.zrrange(&argv[0], offset, limit)?;
    reply_list(raw, out, found);
    Ok(())
}

/// `name key_start score_start score_end limit`
fn score_window(argv: &[String]) -> Result<(Option<i64>, Option<i64>, u64)> {
    Ok((score_bound(&argv[2])?, score_bound(&argv[3])?, number(argv, 4, "limit")?))
}

fn zkeys(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let (start, end, limit) = score_window(argv)?;
    let found = raw.zkeys(&argv[0], &argv[1], start, end, limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn zscan(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let (start, end, limit) = score_window(argv)?;
    let found = raw.zscan(&argv[0], &argv[1], start, end, limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn zrscan(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let (start, end, limit) = score_window(argv)?;
    let found = raw.zrscan(&argv[0], &argv[1], start, end, limit)?;
    reply_list(raw, out, found);
    Ok(())
}

fn multi_zget(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let found = raw.multi_zget(&argv[0], &argv[1..])?;
    reply_list(raw, out, found);
    Ok(())
}

fn multi_zset(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let mut scores = BTreeMap::new();
    for (member, score) in pairs(&argv[1..]) {
        let score = score
            .parse::<i64>()
            .map_err(|_| Error::invalid_argument(format!("score '{}' is not an integer", score)))?;
        scores.insert(member, score);
    }
    raw.multi_zset(&argv[0], &scores)?;
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn multi_zdel(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    raw.multi_zdel(&argv[0], &argv[1..])?;
    reply(raw, out, Value::from(DELETED));
    Ok(())
}

// ==================== Queues ====================

fn qpush(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    for item in &argv[1..] {
        raw.qpush(&argv[0], item)?;
    }
    reply(raw, out, Value::from(STORED));
    Ok(())
}

fn qpop(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let item = raw.qpop(&argv[0])?;
    reply(raw, out, Value::from(item));
    Ok(())
}

fn qslice(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let begin = number(argv, 1, "begin")?;
    let end = number(argv, 2, "end")?;
    let items = raw.qslice(&argv[0], begin, end)?;
    reply_list(raw, out, items);
    Ok(())
}

fn qclear(raw: &mut SsdbRaw, argv: &[String], out: &mut OutputNode) -> Result<()> {
    let removed = raw.qclear(&argv[0])?;
    reply(raw, out, Value::from(removed));
    Ok(())
}

fn command(info: CommandInfo, handler: Handler<SsdbRaw>) -> CommandDescriptor<Handler<SsdbRaw>> {
    CommandDescriptor::new(info, handler)
}

/// The SSDB command table with its handlers.
pub fn command_table() -> Result<CommandTable<Handler<SsdbRaw>>> {
    use ArgShape::{Any, Integer, UInteger};
    CommandTable::new(vec![
        command(CommandInfo::new("AUTH", 1, Some(1)).params("<password>").summary("Authenticate to the server"), auth),
        command(CommandInfo::new("DBSIZE", 0, Some(0)).summary("Return the approximate size of the database"), dbsize),
        command(CommandInfo::new("DEL", 1, Some(1)).params("<key>").summary("Delete specified key"), del),
        command(
            CommandInfo::new("EXPIRE", 2, Some(2))
                .params("<key> <ttl>")
                .summary("Set the time left to live in seconds")
                .shapes(&[Any, Integer]),
            expire,
        ),
        command(CommandInfo::new("FLUSHDB", 0, Some(0)).summary("Delete all keys one by one"), flushdb),
        command(
            CommandInfo::new("GET", 1, Some(1)).params("<key>").summary("Get the value related to the specified key").load_key(),
            get,
        ),
        command(CommandInfo::new("HCLEAR", 1, Some(1)).params("<name>").summary("Delete all keys in a hashmap"), hclear),
        command(CommandInfo::new("HDEL", 2, Some(2)).params("<name> <key>"), hdel),
        command(CommandInfo::new("HELP", 0, Some(1)).params("[command]"), help),
        command(CommandInfo::new("HGET", 2, Some(2)).params("<name> <key>"), hget),
        command(
            CommandInfo::new("HINCR", 3, Some(3)).params("<name> <key> <num>").shapes(&[Any, Any, Integer]),
            hincr,
        ),
        command(
            CommandInfo::new("HKEYS", 4, Some(4))
                .params("<name> <key_start> <key_end> <limit>")
                .shapes(&[Any, Any, Any, UInteger]),
            hkeys,
        ),
        command(
            CommandInfo::new("HRSCAN", 4, Some(4))
                .params("<name> <key_start> <key_end> <limit>")
                .shapes(&[Any, Any, Any, UInteger]),
            hrscan,
        ),
        command(
            CommandInfo::new("HSCAN", 4, Some(4))
                .params("<name> <key_start> <key_end> <limit>")
                .summary("List key-value pairs of a hashmap with keys in range")
                .shapes(&[Any, Any, Any, UInteger])
                .load_key(),
            hscan,
        ),
        command(CommandInfo::new("HSET", 3, Some(3)).params("<name> <key> <value>"), hset),
        command(CommandInfo::new("HSIZE", 1, Some(1)).params("<name>"), hsize),
        command(
            CommandInfo::new("INCR", 2, Some(2)).params("<key> <num>").shapes(&[Any, Integer]),
            incr,
        ),
        command(CommandInfo::new("INFO", 0, Some(1)).params("[opt]").summary("Return information about the server"), info),
        command(
            CommandInfo::new("KEYS", 3, Some(3))
                .params("<key_start> <key_end> <limit>")
                .summary("List keys in range (key_start, key_end]")
                .shapes(&[Any, Any, UInteger]),
            keys,
        ),
        command(CommandInfo::new("MULTI_DEL", 1, None).params("<key1> [key2 ...]"), multi_del),
        command(CommandInfo::new("MULTI_GET", 1, None).params("<key1> [key2 ...]"), multi_get),
        command(CommandInfo::new("MULTI_HGET", 2, None).params("<name> <key1> [key2 ...]"), multi_hget),
        command(
            CommandInfo::new("MULTI_HSET", 3, None).params("<name> <key1> <value1> [key2 value2 ...]").paired_from(1),
            multi_hset,
        ),
        command(
            CommandInfo::new("MULTI_SET", 2, None).params("<key1> <value1> [key2 value2 ...]").paired_from(0),
            multi_set,
        ),
        command(CommandInfo::new("MULTI_ZDEL", 2, None).params("<name> <key1> [key2 ...]"), multi_zdel),
        command(CommandInfo::new("MULTI_ZGET", 2, None).params("<name> <key1> [key2 ...]"), multi_zget),
        command(
            CommandInfo::new("MULTI_ZSET", 3, None).params("<name> <key1> <score1> [key2 score2 ...]").paired_from(1),
            multi_zset,
        ),
        command(CommandInfo::new("QCLEAR", 1, Some(1)).params("<name>"), qclear),
        command(CommandInfo::new("QPOP", 1, Some(1)).params("<name>").summary("Pop an item from the front of a queue"), qpop),
        command(
            CommandInfo::new("QPUSH", 2, None).params("<name> <item> [item ...]").summary("Push items to the back of a queue"),
            qpush,
        ),
        command(
            CommandInfo::new("QSLICE", 3, Some(3))
                .params("<name> <begin> <end>")
                .shapes(&[Any, Integer, Integer])
                .load_key(),
            qslice,
        ),
        command(
            CommandInfo::new("RSCAN", 3, Some(3))
                .params("<key_start> <key_end> <limit>")
                .summary("List key-value pairs in range [key_end, key_start), reverse order")
                .shapes(&[Any, Any, UInteger]),
            rscan,
        ),
        command(
            CommandInfo::new("SCAN", 3, Some(3))
                .params("<key_start> <key_end> <limit>")
                .summary("List key-value pairs in range (key_start, key_end]")
                .shapes(&[Any, Any, UInteger]),
            scan,
        ),
        command(
            CommandInfo::new("SET", 2, Some(2)).params("<key> <value>").summary("Set the value of the key"),
            set,
        ),
        command(
            CommandInfo::new("SETX", 3, Some(3))
                .params("<key> <value> <ttl>")
                .summary("Set the value of the key with a time to live")
                .shapes(&[Any, Any, Integer]),
            setx,
        ),
        command(CommandInfo::new("TTL", 1, Some(1)).params("<key>").summary("Return the time left to live in seconds"), ttl),
        command(CommandInfo::new("ZCLEAR", 1, Some(1)).params("<name>"), zclear),
        command(CommandInfo::new("ZDEL", 2, Some(2)).params("<name> <key>"), zdel),
        command(CommandInfo::new("ZGET", 2, Some(2)).params("<name> <key>"), zget),
        command(
            CommandInfo::new("ZINCR", 3, Some(3)).params("<name> <key> <num>").shapes(&[Any, Any, Integer]),
            zincr,
        ),
        command(
            CommandInfo::new("ZKEYS", 5, Some(5))
                .params("<name> <key_start> <score_start> <score_end> <limit>")
                .shapes(&[Any, Any, Any, Any, UInteger]),
            zkeys,
        ),
        command(
            CommandInfo::new("ZRANGE", 3, Some(3))
                .params("<name> <offset> <limit>")
                .summary("Return a range of key-score pairs by index, ascending")
                .shapes(&[Any, UInteger, UInteger])
                .load_key(),
            zrange,
        ),
        command(CommandInfo::new("ZRANK", 2, Some(2)).params("<name> <key>"), zrank),
        command(
            CommandInfo::new("ZRRANGE", 3, Some(3)).params("<name> <offset> <limit>").shapes(&[Any, UInteger, UInteger]),
            zrrange,
        ),
        command(CommandInfo::new("ZRRANK", 2, Some(2)).params("<name> <key>"), zrrank),
        command(
            CommandInfo::new("ZRSCAN", 5, Some(5))
                .params("<name> <key_start> <score_start> <score_end> <limit>")
                .shapes(&[Any, Any, Any, Any, UInteger]),
            zrscan,
        ),
        command(
            CommandInfo::new("ZSCAN", 5, Some(5))
                .params("<name> <key_start> <score_start> <score_end> <limit>")
                .shapes(&[Any, Any, Any, Any, UInteger]),
            zscan,
        ),
        command(
            CommandInfo::new("ZSET", 3, Some(3)).params("<name> <key> <score>").shapes(&[Any, Any, Integer]),
            zset,
        ),
        command(CommandInfo::new("ZSIZE", 1, Some(1)).params("<name>"), zsize),
    ])
}

/// Dispatcher over [`command_table`].
pub fn command_handler() -> Result<CommandHandler<SsdbRaw>> {
    Ok(CommandHandler::new(command_table()?))
}
