//! Static collection descriptors.
//!
//! Backends use these to know which field carries the document id, which
//! field receives the server-assigned creation timestamp, and which fields
//! are indexed for partitioned or prefix queries. Indexed fields are
//! write-once: field operations never target them.

use crate::model::collections;

#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub collection: &'static str,
    pub id_field: &'static str,
    pub created_field: &'static str,
    /// Field whose value partitions the creation-order index (e.g. the
    /// notification recipient).
    pub partition_field: Option<&'static str>,
    /// Fields served by lexicographic prefix queries.
    pub prefix_fields: &'static [&'static str],
}

pub static COLLECTION_SPECS: &[CollectionSpec] = &[
    CollectionSpec {
        collection: collections::USERS,
        id_field: "uid",
        created_field: "created_at",
        partition_field: None,
        prefix_fields: &["display_name", "username"],
    },
    CollectionSpec {
        collection: collections::POSTS,
        id_field: "id",
        created_field: "created_at",
        partition_field: None,
        prefix_fields: &["content"],
    },
    CollectionSpec {
        collection: collections::NOTIFICATIONS,
        id_field: "id",
        created_field: "created_at",
        partition_field: Some("user_id"),
        prefix_fields: &[],
    },
];

pub fn spec_for(collection: &str) -> Option<&'static CollectionSpec> {
    COLLECTION_SPECS.iter().find(|spec| spec.collection == collection)
}
