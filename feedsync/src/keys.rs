/// Common key-construction helpers for the redis-backed store.
///
/// Key layout:
/// - entity document: `{prefix}:{collection}:{entity_id}`
/// - creation-order index: `{prefix}:{collection}:idx:created`
/// - per-value partition index: `{prefix}:{collection}:idx:{field}:{value}`
/// - prefix (lexicographic) index: `{prefix}:{collection}:lex:{field}`
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn entity(&self, collection: &str, entity_id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, entity_id)
    }

    pub fn created_index(&self, collection: &str) -> String {
        format!("{}:{}:idx:created", self.prefix, collection)
    }

    pub fn partition_index(&self, collection: &str, field: &str, value: &str) -> String {
        format!("{}:{}:idx:{}:{}", self.prefix, collection, field, value)
    }

    pub fn lex_index(&self, collection: &str, field: &str) -> String {
        format!("{}:{}:lex:{}", self.prefix, collection, field)
    }

    /// Key holding the store's monotonic timestamp watermark.
    pub fn clock(&self) -> String {
        format!("{}:clock", self.prefix)
    }

    /// Glob pattern matching every key written under this prefix.
    /// Useful for test cleanup.
    pub fn prefix_pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }
}
