//! In-process store used by the test suite and by embedders that want a
//! local backing store. Every operation takes the single write lock, so
//! field operations are atomic with respect to concurrent callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::errors::FeedError;
use crate::id::generate_entity_id;

use super::{
    Cursor, Document, FieldOp, FieldOpKind, Query, SortOrder, Store, materialize_payload, schema::spec_for,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Value>>>>,
    last_ts: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-assigned timestamps are strictly monotonic: concurrent
    /// writers in the same microsecond still observe distinct values.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_micros();
        self.last_ts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(last.max(now - 1) + 1))
            .map(|last| last.max(now - 1) + 1)
            .unwrap_or(now)
    }

    fn materialize(&self, collection: &str, id: &str, data: Value) -> Result<Value, FeedError> {
        let spec = spec_for(collection).ok_or_else(|| FeedError::StoreUnavailable {
            message: format!("unknown collection `{collection}`"),
        })?;
        materialize_payload(spec, id, self.next_timestamp(), data)
    }
}

fn apply_op(doc: &mut serde_json::Map<String, Value>, op: &FieldOp, ts: i64) {
    match &op.kind {
        FieldOpKind::Set(value) => {
            doc.insert(op.field.clone(), value.clone());
        }
        FieldOpKind::ArrayUnion(values) => {
            let slot = doc.entry(op.field.clone()).or_insert_with(|| json!([]));
            if !slot.is_array() {
                *slot = json!([]);
            }
            let array = slot.as_array_mut().expect("slot coerced to array above");
            for value in values {
                if !array.contains(value) {
                    array.push(value.clone());
                }
            }
        }
        FieldOpKind::ArrayRemove(values) => {
            if let Some(array) = doc.get_mut(&op.field).and_then(Value::as_array_mut) {
                array.retain(|existing| !values.contains(existing));
            }
        }
        FieldOpKind::Increment(delta) => {
            let current = doc.get(&op.field).and_then(Value::as_i64).unwrap_or(0);
            doc.insert(op.field.clone(), json!(current + delta));
        }
        FieldOpKind::ServerTimestamp => {
            doc.insert(op.field.clone(), json!(ts));
        }
    }
}

fn created_micros(data: &Value, created_field: &str) -> i64 {
    data.get(created_field).and_then(Value::as_i64).unwrap_or(0)
}

impl Store for MemoryStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<Document, FeedError> {
        let id = generate_entity_id();
        let data = self.materialize(collection, &id, data)?;
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());
        Ok(Document { id, data })
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<Document, FeedError> {
        let data = self.materialize(collection, id, data)?;
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data.clone());
        Ok(Document {
            id: id.to_string(),
            data,
        })
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FeedError> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).and_then(|docs| docs.get(id)).map(|data| Document {
            id: id.to_string(),
            data: data.clone(),
        }))
    }

    async fn update(&self, collection: &str, id: &str, ops: Vec<FieldOp>) -> Result<(), FeedError> {
        let ts = self.next_timestamp();
        let mut guard = self.collections.write().await;
        let data = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| FeedError::not_found(id))?;
        let object = data.as_object_mut().ok_or_else(|| FeedError::StoreUnavailable {
            message: format!("document {id} is not an object"),
        })?;
        for op in &ops {
            apply_op(object, op, ts);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), FeedError> {
        let mut guard = self.collections.write().await;
        if let Some(docs) = guard.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<Document>, FeedError> {
        let spec = spec_for(&query.collection).ok_or_else(|| FeedError::StoreUnavailable {
            message: format!("unknown collection `{}`", query.collection),
        })?;
        let guard = self.collections.read().await;
        let Some(docs) = guard.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<(i64, String, Value)> = docs
            .iter()
            .filter(|(_, data)| match &query.filter_eq {
                Some((field, expected)) => data.get(field).and_then(Value::as_str) == Some(expected.as_str()),
                None => true,
            })
            .filter(|(_, data)| match &query.prefix {
                Some((field, prefix)) => data
                    .get(field)
                    .and_then(Value::as_str)
                    .map(|value| value.starts_with(prefix.as_str()))
                    .unwrap_or(false),
                None => true,
            })
            .map(|(id, data)| (created_micros(data, spec.created_field), id.clone(), data.clone()))
            .collect();

        matches.sort_by(|a, b| {
            let key_a = (a.0, &a.1);
            let key_b = (b.0, &b.1);
            match query.order {
                SortOrder::Asc => key_a.cmp(&key_b),
                SortOrder::Desc => key_b.cmp(&key_a),
            }
        });

        let after = |entry: &(i64, String, Value), cursor: &Cursor| match query.order {
            SortOrder::Asc => (entry.0, entry.1.as_str()) > (cursor.created_at_micros, cursor.id.as_str()),
            SortOrder::Desc => (entry.0, entry.1.as_str()) < (cursor.created_at_micros, cursor.id.as_str()),
        };

        let documents = matches
            .into_iter()
            .filter(|entry| match &query.start_after {
                Some(cursor) => after(entry, cursor),
                None => true,
            })
            .take(query.limit as usize)
            .map(|(_, id, data)| Document { id, data })
            .collect();
        Ok(documents)
    }
}
