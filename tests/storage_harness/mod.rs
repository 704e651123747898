//! Shared test harness for repository backends
//!
//! Provides `TestRecord`, an entity with string, integer, float and boolean
//! fields, helpers for building records and payloads, and two macro-generated
//! suites every backend runs:
//!
//! - `repository_tests!`: the `Repository<TestRecord>` contract
//! - `rest_integration_tests!`: the HTTP contract of a `CrudController`
//!   backed by the repository
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! repository_tests!(InMemoryRepository::<TestRecord>::new());
//! ```

#![allow(dead_code)]

use crud::core::entity::Entity;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

#[macro_use]
pub mod repository_tests;
#[macro_use]
pub mod rest_tests;

// ---------------------------------------------------------------------------
// TestRecord
// ---------------------------------------------------------------------------

/// A test entity with fields spanning every JSON scalar kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub is_deleted: bool,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub score: f64,
    pub active: bool,
}

impl Entity for TestRecord {
    fn resource_name() -> &'static str {
        "test_records"
    }

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

/// Build an unsaved record
pub fn create_test_record(name: &str, email: &str, age: i64, score: f64, active: bool) -> TestRecord {
    TestRecord {
        id: None,
        is_deleted: false,
        name: name.to_string(),
        email: email.to_string(),
        age,
        score,
        active,
    }
}

/// JSON payload of a record, as a client would post it
pub fn record_payload(name: &str, age: i64) -> Value {
    json!({
        "name": name,
        "email": format!("{}@test.com", name.to_lowercase()),
        "age": age,
        "score": 1.5,
        "active": true
    })
}
