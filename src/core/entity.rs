//! Entity trait defining what the CRUD layer needs to know about a record

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Name of the identifier field in an entity's JSON form
pub const ID_FIELD: &str = "id";

/// Base trait for every record managed by a [`CrudController`](crate::server::CrudController).
///
/// The CRUD layer treats entities as opaque JSON objects. It only ever reads
/// or writes two things:
/// - the identifier, assigned by the repository on first save
/// - the soft-delete marker, toggled by `softDelete` and `restore`
///
/// Use [`impl_crud_entity!`](crate::impl_crud_entity) to declare an entity
/// without writing this impl by hand.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Plural resource name (e.g., "companies"), used for table names and mount paths
    fn resource_name() -> &'static str;

    /// Identifier of this entity, `None` until it has been saved
    fn id(&self) -> Option<Uuid>;

    /// Assign the identifier (called by repositories on insert)
    fn set_id(&mut self, id: Uuid);

    /// Whether the entity is flagged as soft-deleted
    fn is_deleted(&self) -> bool;

    /// Set or clear the soft-delete flag
    fn set_deleted(&mut self, deleted: bool);
}

/// Build a new entity from a JSON payload.
pub fn from_payload<T: Entity>(payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| anyhow!("Failed to build {} from payload: {}", T::resource_name(), e))
}

/// Overlay the top-level fields of `payload` onto `target`.
///
/// The identifier of `target` always wins over an `id` carried by the payload.
pub fn merge_payload<T: Entity>(target: T, payload: Value) -> Result<T> {
    let Value::Object(patch) = payload else {
        return Err(anyhow!("Update payload must be a JSON object"));
    };

    let mut current = serde_json::to_value(&target)
        .map_err(|e| anyhow!("Failed to serialize {}: {}", T::resource_name(), e))?;
    let fields = current
        .as_object_mut()
        .ok_or_else(|| anyhow!("{} does not serialize to a JSON object", T::resource_name()))?;

    for (key, value) in patch {
        if key == ID_FIELD {
            continue;
        }
        fields.insert(key, value);
    }

    let mut merged: T = from_payload(current)?;
    if let Some(id) = target.id() {
        merged.set_id(id);
    }
    Ok(merged)
}
