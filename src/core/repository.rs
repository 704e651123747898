//! Repository trait consumed by the CRUD controller

use crate::core::entity::{self, Entity};
use crate::core::query::SearchCriteria;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// Persistence abstraction for a single entity type
///
/// Lookups never fail for a missing record: they return `None` or an empty
/// collection. Errors are reserved for backend faults (I/O, constraint
/// violations, serialization), which the controller turns into 500s.
/// Transaction and locking discipline belong to the implementation.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Every stored entity, in storage order
    async fn find(&self) -> Result<Vec<T>>;

    /// Entities matching every criterion
    async fn find_by(&self, criteria: &SearchCriteria) -> Result<Vec<T>>;

    /// A window of `take` entities after skipping `skip`, with the total count
    async fn find_and_count(&self, take: usize, skip: usize) -> Result<(Vec<T>, usize)>;

    /// Entity with the given identifier, if any
    async fn find_one_by_id(&self, id: &Uuid) -> Result<Option<T>>;

    /// Insert or replace an entity, assigning an identifier when it has none
    async fn save(&self, entity: T) -> Result<T>;

    /// Remove an entity, returning the number of affected records
    async fn delete(&self, id: &Uuid) -> Result<u64>;

    /// Number of stored entities
    async fn count(&self) -> Result<usize>;

    /// Save several entities, preserving input order in the result
    async fn save_many(&self, entities: Vec<T>) -> Result<Vec<T>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity).await?);
        }
        Ok(saved)
    }

    /// Build an unsaved entity from a request payload
    fn create(&self, payload: Value) -> Result<T> {
        entity::from_payload(payload)
    }

    /// Build unsaved entities from an array of payloads
    fn create_many(&self, payloads: Vec<Value>) -> Result<Vec<T>> {
        payloads
            .into_iter()
            .enumerate()
            .map(|(index, payload)| {
                self.create(payload)
                    .map_err(|e| anyhow!("Item {}: {}", index, e))
            })
            .collect()
    }

    /// Overlay a partial payload onto an existing entity
    fn merge(&self, target: T, payload: Value) -> Result<T> {
        entity::merge_payload(target, payload)
    }
}
