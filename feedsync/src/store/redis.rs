//! Redis-backed store.
//!
//! Documents are stored as JSON strings; every multi-key write goes
//! through a Lua script so the document and its index entries move
//! together under concurrent writers. Creation order is served by a
//! per-collection sorted set, partitioned reads (notifications per
//! recipient) by a per-value sorted set, and prefix queries by a
//! lexicographic sorted set whose members are `{value}\0{id}`.

use std::sync::LazyLock;

use redis::{Script, aio::ConnectionManager, cmd};
use serde_json::{Value, json};

use crate::errors::FeedError;
use crate::id::generate_entity_id;
use crate::keys::KeyContext;

use super::{
    Document, FieldOp, FieldOpKind, Query, SortOrder, Store, materialize_payload,
    schema::{CollectionSpec, spec_for},
};

pub const ALLOC_TS_SCRIPT_BODY: &str = include_str!("../../lua/alloc_ts.lua");
pub const DOC_PUT_SCRIPT_BODY: &str = include_str!("../../lua/doc_put.lua");
pub const FIELD_OPS_SCRIPT_BODY: &str = include_str!("../../lua/field_ops.lua");
pub const DOC_DELETE_SCRIPT_BODY: &str = include_str!("../../lua/doc_delete.lua");

static ALLOC_TS_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(ALLOC_TS_SCRIPT_BODY));
static DOC_PUT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOC_PUT_SCRIPT_BODY));
static FIELD_OPS_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(FIELD_OPS_SCRIPT_BODY));
static DOC_DELETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOC_DELETE_SCRIPT_BODY));

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

fn require_spec(collection: &str) -> Result<&'static CollectionSpec, FeedError> {
    spec_for(collection).ok_or_else(|| FeedError::StoreUnavailable {
        message: format!("unknown collection `{collection}`"),
    })
}

fn parse_document(id: String, raw: &str) -> Result<Document, FeedError> {
    let data = serde_json::from_str(raw).map_err(|err| FeedError::StoreUnavailable {
        message: format!("failed to parse document {id}: {err}"),
    })?;
    Ok(Document { id, data })
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Create a store from a redis connection URL.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, FeedError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn keys(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    async fn alloc_timestamp(&self) -> Result<i64, FeedError> {
        let mut conn = self.conn.clone();
        let ts: i64 = ALLOC_TS_SCRIPT
            .prepare_invoke()
            .key(self.keys().clock())
            .invoke_async(&mut conn)
            .await?;
        Ok(ts)
    }

    async fn put(&self, spec: &CollectionSpec, id: &str, data: Value) -> Result<Document, FeedError> {
        let ts = self.alloc_timestamp().await?;
        let data = materialize_payload(spec, id, ts, data)?;
        let created = data.get(spec.created_field).and_then(Value::as_i64).unwrap_or(ts);
        let payload = serde_json::to_string(&data).map_err(|err| FeedError::StoreUnavailable {
            message: format!("failed to serialize document: {err}"),
        })?;

        let keys = self.keys();
        let partition_key = spec
            .partition_field
            .and_then(|field| {
                data.get(field)
                    .and_then(Value::as_str)
                    .map(|value| keys.partition_index(spec.collection, field, value))
            })
            .unwrap_or_default();

        let mut invocation = DOC_PUT_SCRIPT.prepare_invoke();
        invocation
            .key(keys.entity(spec.collection, id))
            .key(keys.created_index(spec.collection))
            .arg(payload)
            .arg(id)
            .arg(created)
            .arg(partition_key);
        for field in spec.prefix_fields {
            if let Some(value) = data.get(*field).and_then(Value::as_str) {
                invocation
                    .arg(keys.lex_index(spec.collection, field))
                    .arg(format!("{value}\0{id}"));
            }
        }
        let mut conn = self.conn.clone();
        let _: () = invocation.invoke_async(&mut conn).await?;
        Ok(Document {
            id: id.to_string(),
            data,
        })
    }

    /// Delete every key written under this store's prefix via SCAN + DEL.
    /// Used by test harnesses to reclaim a namespace without blocking redis.
    pub async fn cleanup(&self) -> Result<u64, FeedError> {
        const SCAN_COUNT: usize = 1000;
        let pattern = self.keys().prefix_pattern();
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                let deleted: u64 = cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                total_deleted += deleted;
            }
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(total_deleted)
    }
}

fn flatten_ops(ops: &[FieldOp]) -> Value {
    let flattened: Vec<Value> = ops
        .iter()
        .map(|op| {
            let (name, value) = match &op.kind {
                FieldOpKind::Set(value) => ("set", value.clone()),
                FieldOpKind::ArrayUnion(values) => ("array_union", Value::Array(values.clone())),
                FieldOpKind::ArrayRemove(values) => ("array_remove", Value::Array(values.clone())),
                FieldOpKind::Increment(delta) => ("increment", json!(delta)),
                FieldOpKind::ServerTimestamp => ("server_timestamp", Value::Null),
            };
            json!({ "field": op.field, "op": name, "value": value })
        })
        .collect();
    Value::Array(flattened)
}

impl Store for RedisStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<Document, FeedError> {
        let spec = require_spec(collection)?;
        let id = generate_entity_id();
        self.put(spec, &id, data).await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<Document, FeedError> {
        let spec = require_spec(collection)?;
        self.put(spec, id, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FeedError> {
        let spec = require_spec(collection)?;
        let key = self.keys().entity(spec.collection, id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = cmd("GET").arg(&key).query_async(&mut conn).await?;
        match raw {
            Some(raw) => Ok(Some(parse_document(id.to_string(), &raw)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, collection: &str, id: &str, ops: Vec<FieldOp>) -> Result<(), FeedError> {
        let spec = require_spec(collection)?;
        let keys = self.keys();
        let payload = serde_json::to_string(&flatten_ops(&ops)).map_err(|err| FeedError::StoreUnavailable {
            message: format!("failed to serialize field ops: {err}"),
        })?;
        let mut conn = self.conn.clone();
        let raw: String = FIELD_OPS_SCRIPT
            .prepare_invoke()
            .key(keys.entity(spec.collection, id))
            .key(keys.clock())
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;
        let response: Value = serde_json::from_str(&raw).map_err(|err| FeedError::StoreUnavailable {
            message: format!("failed to parse script response: {err}"),
        })?;
        match response.get("err").and_then(Value::as_str) {
            Some("not_found") => Err(FeedError::not_found(id)),
            Some(other) => Err(FeedError::unavailable(other.to_string())),
            None => Ok(()),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), FeedError> {
        let spec = require_spec(collection)?;
        let keys = self.keys();
        let lex: Vec<Value> = spec
            .prefix_fields
            .iter()
            .map(|field| json!({ "field": field, "key": keys.lex_index(spec.collection, field) }))
            .collect();
        let mut req = json!({ "lex": lex });
        if let Some(field) = spec.partition_field {
            req["partition_field"] = json!(field);
            req["partition_key_prefix"] = json!(keys.partition_index(spec.collection, field, ""));
        }
        let mut conn = self.conn.clone();
        let _: String = DOC_DELETE_SCRIPT
            .prepare_invoke()
            .key(keys.entity(spec.collection, id))
            .key(keys.created_index(spec.collection))
            .arg(id)
            .arg(req.to_string())
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<Document>, FeedError> {
        let spec = require_spec(&query.collection)?;
        let keys = self.keys();
        let mut conn = self.conn.clone();

        let ids: Vec<String> = if let Some((field, prefix_value)) = &query.prefix {
            if !spec.prefix_fields.contains(&field.as_str()) {
                return Err(FeedError::unavailable(format!(
                    "field `{field}` is not prefix-indexed on `{}`",
                    query.collection
                )));
            }
            let mut lower = Vec::with_capacity(prefix_value.len() + 1);
            lower.push(b'[');
            lower.extend_from_slice(prefix_value.as_bytes());
            let mut upper = lower.clone();
            upper.push(0xff);
            let members: Vec<String> = cmd("ZRANGEBYLEX")
                .arg(keys.lex_index(spec.collection, field))
                .arg(lower)
                .arg(upper)
                .arg("LIMIT")
                .arg(0)
                .arg(query.limit)
                .query_async(&mut conn)
                .await?;
            members
                .iter()
                .filter_map(|member| member.rsplit_once('\0').map(|(_, id)| id.to_string()))
                .collect()
        } else {
            let index_key = match (&query.filter_eq, spec.partition_field) {
                (Some((field, value)), Some(partition)) if field == partition => {
                    keys.partition_index(spec.collection, partition, value)
                }
                (Some((field, _)), _) => {
                    return Err(FeedError::unavailable(format!(
                        "field `{field}` is not partition-indexed on `{}`",
                        query.collection
                    )));
                }
                (None, _) => keys.created_index(spec.collection),
            };
            match query.order {
                SortOrder::Desc => {
                    let max = query
                        .start_after
                        .as_ref()
                        .map(|cursor| format!("({}", cursor.created_at_micros))
                        .unwrap_or_else(|| "+inf".to_string());
                    cmd("ZREVRANGEBYSCORE")
                        .arg(&index_key)
                        .arg(max)
                        .arg("-inf")
                        .arg("LIMIT")
                        .arg(0)
                        .arg(query.limit)
                        .query_async(&mut conn)
                        .await?
                }
                SortOrder::Asc => {
                    let min = query
                        .start_after
                        .as_ref()
                        .map(|cursor| format!("({}", cursor.created_at_micros))
                        .unwrap_or_else(|| "-inf".to_string());
                    cmd("ZRANGEBYSCORE")
                        .arg(&index_key)
                        .arg(min)
                        .arg("+inf")
                        .arg("LIMIT")
                        .arg(0)
                        .arg(query.limit)
                        .query_async(&mut conn)
                        .await?
                }
            }
        };

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let doc_keys: Vec<String> = ids.iter().map(|id| keys.entity(spec.collection, id)).collect();
        let raws: Vec<Option<String>> = cmd("MGET").arg(&doc_keys).query_async(&mut conn).await?;
        let mut documents = Vec::with_capacity(ids.len());
        for (id, raw) in ids.into_iter().zip(raws) {
            // A document deleted between the index read and the fetch is
            // skipped rather than failing the page.
            if let Some(raw) = raw {
                documents.push(parse_document(id, &raw)?);
            }
        }
        Ok(documents)
    }
}
