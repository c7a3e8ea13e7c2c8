// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Entities: annotations such as links, mentions or images that span a run
//! of characters.
//!
//! Characters only store the entity *key*; the entity itself lives in the
//! [`EntityMap`] owned by the document's [`crate::ContentState`]. Each
//! document therefore has its own isolated entity namespace.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{Result, TransactionError};

/// Arbitrary JSON attached to an entity.
pub type EntityData = Map<String, Value>;

/// How an entity reacts to edits of the text it covers.
///
/// | Mutability  | Typing inside     | Removing part of it        |
/// |-------------|-------------------|----------------------------|
/// | `Mutable`   | extends the entity | removes only those chars  |
/// | `Immutable` | never extends it  | removes the whole entity   |
/// | `Segmented` | never extends it  | removes whole words        |
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    Mutable,
    Immutable,
    Segmented,
}

/// A single entity record.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftEntity {
    entity_type: String,
    mutability: Mutability,
    data: EntityData,
}

impl DraftEntity {
    pub fn new(
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: EntityData,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }
}

/// The entities of one document, keyed by monotonically issued string keys.
///
/// Cloning is cheap; the table is copied on the first write after a clone.
#[derive(Clone, Debug, Default)]
pub struct EntityMap {
    entities: Arc<BTreeMap<String, DraftEntity>>,
    last_key: u64,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&DraftEntity> {
        self.entities.get(key)
    }

    /// Look up `key`, treating a missing entity as a contract violation.
    pub fn lookup(&self, key: &str) -> Result<&DraftEntity> {
        self.entities
            .get(key)
            .ok_or_else(|| TransactionError::EntityNotFound(key.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DraftEntity)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The key handed out by the most recent [`EntityMap::add`].
    pub fn last_created_key(&self) -> Option<String> {
        (self.last_key > 0).then(|| self.last_key.to_string())
    }

    /// Store `entity` under a fresh key and return the key.
    pub fn add(&mut self, entity: DraftEntity) -> String {
        self.last_key += 1;
        let key = self.last_key.to_string();
        Arc::make_mut(&mut self.entities).insert(key.clone(), entity);
        key
    }

    pub fn create(
        &mut self,
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: EntityData,
    ) -> String {
        self.add(DraftEntity::new(entity_type, mutability, data))
    }

    /// Shallow-merge `data` into the entity's existing data.
    pub fn merge_data(&mut self, key: &str, data: EntityData) -> Result<()> {
        let entity = self.entity_mut(key)?;
        entity.data.extend(data);
        Ok(())
    }

    /// Replace the entity's data wholesale.
    pub fn replace_data(&mut self, key: &str, data: EntityData) -> Result<()> {
        let entity = self.entity_mut(key)?;
        entity.data = data;
        Ok(())
    }

    fn entity_mut(&mut self, key: &str) -> Result<&mut DraftEntity> {
        Arc::make_mut(&mut self.entities)
            .get_mut(key)
            .ok_or_else(|| TransactionError::EntityNotFound(key.to_owned()))
    }
}

impl PartialEq for EntityMap {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entities, &other.entities)
            || self.entities == other.entities
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::{EntityData, EntityMap, Mutability};
    use crate::TransactionError;

    fn data(value: serde_json::Value) -> EntityData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn keys_are_issued_monotonically() {
        let mut map = EntityMap::new();
        assert_eq!(map.last_created_key(), None);
        let first = map.create("LINK", Mutability::Mutable, EntityData::new());
        let second = map.create("IMAGE", Mutability::Immutable, EntityData::new());
        assert_eq!(first, "1");
        assert_eq!(second, "2");
        assert_eq!(map.last_created_key().as_deref(), Some("2"));
        assert_eq!(map.lookup("2").unwrap().entity_type(), "IMAGE");
    }

    #[test]
    fn merge_data_overlays_existing_keys() {
        let mut map = EntityMap::new();
        let key = map.create(
            "LINK",
            Mutability::Mutable,
            data(json!({ "url": "a", "title": "t" })),
        );
        map.merge_data(&key, data(json!({ "url": "b" }))).unwrap();
        assert_eq!(
            map.get(&key).unwrap().data(),
            &data(json!({ "url": "b", "title": "t" }))
        );
    }

    #[test]
    fn replace_data_discards_old_keys() {
        let mut map = EntityMap::new();
        let key = map.create("LINK", Mutability::Mutable, data(json!({ "a": 1 })));
        map.replace_data(&key, data(json!({ "b": 2 }))).unwrap();
        assert_eq!(map.get(&key).unwrap().data(), &data(json!({ "b": 2 })));
    }

    #[test]
    fn unknown_keys_are_errors() {
        let mut map = EntityMap::new();
        assert_eq!(
            map.merge_data("9", EntityData::new()),
            Err(TransactionError::EntityNotFound("9".into()))
        );
        assert!(map.lookup("9").is_err());
    }

    #[test]
    fn clones_are_isolated() {
        let mut original = EntityMap::new();
        original.create("LINK", Mutability::Mutable, EntityData::new());
        let mut copy = original.clone();
        copy.create("LINK", Mutability::Mutable, EntityData::new());
        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn mutability_uses_upper_snake_case_names() {
        assert_eq!(Mutability::Segmented.to_string(), "SEGMENTED");
        assert_eq!(
            Mutability::from_str("IMMUTABLE").unwrap(),
            Mutability::Immutable
        );
    }
}
