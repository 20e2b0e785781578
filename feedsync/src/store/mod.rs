//! Abstract document-store capability consumed by the feed core.
//!
//! The core never talks to a concrete backend: it issues document CRUD,
//! atomic field operations, and ordered/prefix queries against this trait.
//! Two implementations ship with the crate: [`MemoryStore`] for tests and
//! embedders, and [`RedisStore`] for a hosted deployment.

mod memory;
mod redis;
mod schema;

pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use schema::{CollectionSpec, spec_for};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::errors::FeedError;

/// A stored document: its assigned id plus the JSON payload (which also
/// carries the id under the collection's id field).
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, FeedError> {
        serde_json::from_value(self.data.clone()).map_err(|err| FeedError::StoreUnavailable {
            message: format!("failed to deserialize document {}: {err}", self.id),
        })
    }
}

/// Atomic mutation of a single document field.
///
/// Union/remove/increment are store-native primitives, safe under
/// concurrent writers; the core never read-modify-writes a shared array
/// or counter. Field operations must not target a collection's indexed
/// fields (id, creation timestamp, partition, prefix fields); those are
/// write-once at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOp {
    pub field: String,
    pub kind: FieldOpKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldOpKind {
    /// Overwrite the field.
    Set(Value),
    /// Add each element absent from the array; duplicates are no-ops.
    ArrayUnion(Vec<Value>),
    /// Remove each matching element; removing an absent element is a no-op.
    ArrayRemove(Vec<Value>),
    /// Add to a numeric field, treating a missing field as zero.
    Increment(i64),
    /// Set the field to the store's current timestamp (epoch microseconds).
    ServerTimestamp,
}

impl FieldOp {
    pub fn set(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            kind: FieldOpKind::Set(value),
        }
    }

    pub fn array_union(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            kind: FieldOpKind::ArrayUnion(values),
        }
    }

    pub fn array_remove(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            kind: FieldOpKind::ArrayRemove(values),
        }
    }

    pub fn increment(field: impl Into<String>, delta: i64) -> Self {
        Self {
            field: field.into(),
            kind: FieldOpKind::Increment(delta),
        }
    }

    pub fn server_timestamp(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldOpKind::ServerTimestamp,
        }
    }
}

/// Marker key identifying a server-timestamp sentinel value.
pub const SERVER_TIMESTAMP_FIELD: &str = "$server_timestamp";

/// Sentinel value replaced by the store's current timestamp at write time.
pub fn server_timestamp() -> Value {
    let mut object = serde_json::Map::with_capacity(1);
    object.insert(SERVER_TIMESTAMP_FIELD.to_string(), Value::Bool(true));
    Value::Object(object)
}

pub(crate) fn is_server_timestamp_sentinel(value: &Value) -> bool {
    value
        .as_object()
        .map(|object| object.len() == 1 && object.get(SERVER_TIMESTAMP_FIELD).is_some())
        .unwrap_or(false)
}

/// Stamp a payload for writing: inject the assigned id, resolve timestamp
/// sentinels, and default the creation field to the server timestamp.
pub(crate) fn materialize_payload(
    spec: &CollectionSpec,
    id: &str,
    ts: i64,
    mut data: Value,
) -> Result<Value, FeedError> {
    let object = data.as_object_mut().ok_or_else(|| FeedError::StoreUnavailable {
        message: "document payload must be a JSON object".to_string(),
    })?;
    object.insert(spec.id_field.to_string(), Value::String(id.to_string()));
    for (_, value) in object.iter_mut() {
        if is_server_timestamp_sentinel(value) {
            *value = Value::from(ts);
        }
    }
    let needs_created = object.get(spec.created_field).map(Value::is_null).unwrap_or(true);
    if needs_created {
        object.insert(spec.created_field.to_string(), Value::from(ts));
    }
    Ok(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Continuation token for paginated queries. Creation timestamps are
/// monotonic per store, so `(created_at, id)` identifies a stable position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at_micros: i64,
    pub id: String,
}

/// An ordered range query over one collection.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    /// Equality filter; on the redis backend this must name the
    /// collection's partition field.
    pub filter_eq: Option<(String, String)>,
    /// Prefix filter over one of the collection's prefix-indexed fields.
    pub prefix: Option<(String, String)>,
    pub order: SortOrder,
    pub limit: u64,
    pub start_after: Option<Cursor>,
}

impl Query {
    /// Creation-time-descending query, the shape of every feed read.
    pub fn recent(collection: impl Into<String>, limit: u64) -> Self {
        Self {
            collection: collection.into(),
            filter_eq: None,
            prefix: None,
            order: SortOrder::Desc,
            limit,
            start_after: None,
        }
    }

    /// Prefix-range query over an indexed text field.
    pub fn prefix(collection: impl Into<String>, field: impl Into<String>, value: impl Into<String>, limit: u64) -> Self {
        Self {
            collection: collection.into(),
            filter_eq: None,
            prefix: Some((field.into(), value.into())),
            order: SortOrder::Asc,
            limit,
            start_after: None,
        }
    }

    pub fn filtered(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_eq = Some((field.into(), value.into()));
        self
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }
}

/// The document-store contract.
///
/// Every method is one logical remote request; implementations surface
/// transport failures as [`FeedError::StoreUnavailable`] and absent
/// mutation targets as [`FeedError::NotFound`].
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Insert a document with a store-assigned id and server-assigned
    /// creation timestamp. Returns the materialized document so callers
    /// never need a second round trip to learn the id.
    async fn insert(&self, collection: &str, data: Value) -> Result<Document, FeedError>;

    /// Write a document under a caller-chosen id (profiles are keyed by
    /// the session uid). The creation timestamp is server-assigned when
    /// the payload does not carry one.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<Document, FeedError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FeedError>;

    /// Apply atomic field operations to an existing document.
    async fn update(&self, collection: &str, id: &str, ops: Vec<FieldOp>) -> Result<(), FeedError>;

    /// Hard-delete. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), FeedError>;

    async fn query(&self, query: Query) -> Result<Vec<Document>, FeedError>;
}
