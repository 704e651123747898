//! In-memory implementation of Repository for testing and development

use crate::core::entity::Entity;
use crate::core::query::SearchCriteria;
use crate::core::repository::Repository;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory repository
///
/// Entities are kept in insertion order, so `find` and `find_and_count`
/// return them oldest first. Uses RwLock for thread-safe access; clones
/// share the same store.
#[derive(Clone)]
pub struct InMemoryRepository<T> {
    entities: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryRepository<T> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Create a repository pre-filled with `entities`, assigning missing ids
    pub fn with_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let map = entities
            .into_iter()
            .map(|mut entity| {
                let id = entity.id().unwrap_or_else(Uuid::new_v4);
                entity.set_id(id);
                (id, entity)
            })
            .collect();
        Self {
            entities: Arc::new(RwLock::new(map)),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn find(&self) -> Result<Vec<T>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entities.values().cloned().collect())
    }

    async fn find_by(&self, criteria: &SearchCriteria) -> Result<Vec<T>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matching = Vec::new();
        for entity in entities.values() {
            let json = serde_json::to_value(entity)?;
            if criteria.matches(&json) {
                matching.push(entity.clone());
            }
        }
        Ok(matching)
    }

    async fn find_and_count(&self, take: usize, skip: usize) -> Result<(Vec<T>, usize)> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let page = entities.values().skip(skip).take(take).cloned().collect();
        Ok((page, entities.len()))
    }

    async fn find_one_by_id(&self, id: &Uuid) -> Result<Option<T>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entities.get(id).cloned())
    }

    async fn save(&self, mut entity: T) -> Result<T> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = entity.id().unwrap_or_else(Uuid::new_v4);
        entity.set_id(id);
        // Replacing keeps the original position
        entities.insert(id, entity.clone());

        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> Result<u64> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(u64::from(entities.shift_remove(id).is_some()))
    }

    async fn count(&self) -> Result<usize> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entities.len())
    }
}
