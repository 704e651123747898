//! Macro-generated test suite for `Repository<TestRecord>` contract validation.
//!
//! # Generated Tests
//!
//! ## Lookups and writes
//! - `test_save_and_find_one`: save assigns an id, lookup returns the record
//! - `test_find_one_nonexistent`: random id returns None
//! - `test_find_empty`: empty store returns an empty vec
//! - `test_find_insertion_order`: records come back oldest first
//! - `test_save_existing_replaces`: saving a known id replaces the record
//! - `test_delete_existing` / `test_delete_nonexistent`: affected counts 1 and 0
//!
//! ## Paging and counting
//! - `test_find_and_count_window`: skip/take window plus total
//! - `test_count`
//!
//! ## Search
//! - string, integer, float and boolean fields, combined criteria, no match,
//!   unknown field
//!
//! ## Provided methods and concurrency
//! - `test_save_many_preserves_order`, `test_create_and_merge_payloads`,
//!   `test_concurrent_saves`

/// Generate a full `Repository<TestRecord>` conformance test suite.
///
/// `$factory` must evaluate to a fresh, empty repository implementing
/// `Repository<TestRecord> + Clone + 'static`. It is re-evaluated for each test.
#[macro_export]
macro_rules! repository_tests {
    ($factory:expr) => {
        mod repository_contract_tests {
            use super::*;
            use crud::core::query::SearchCriteria;
            use crud::core::repository::Repository;
            use serde_json::json;
            use uuid::Uuid;

            // ==================================================================
            // Lookups and writes
            // ==================================================================

            #[tokio::test]
            async fn test_save_and_find_one() {
                let repo = $factory;
                let saved = repo
                    .save(create_test_record("Alice", "alice@test.com", 30, 4.5, true))
                    .await
                    .unwrap();

                let id = saved.id.expect("save must assign an id");
                let found = repo.find_one_by_id(&id).await.unwrap().unwrap();
                assert_eq!(found, saved);
                assert_eq!(found.name, "Alice");
                assert!((found.score - 4.5).abs() < f64::EPSILON);
            }

            #[tokio::test]
            async fn test_find_one_nonexistent() {
                let repo = $factory;
                assert!(repo.find_one_by_id(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_find_empty() {
                let repo = $factory;
                assert!(repo.find().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_find_insertion_order() {
                let repo = $factory;
                for name in ["first", "second", "third"] {
                    repo.save(create_test_record(name, "x@test.com", 1, 1.0, true))
                        .await
                        .unwrap();
                }

                let names: Vec<String> = repo.find().await.unwrap().into_iter().map(|r| r.name).collect();
                assert_eq!(names, vec!["first", "second", "third"]);
            }

            #[tokio::test]
            async fn test_save_existing_replaces() {
                let repo = $factory;
                let mut saved = repo
                    .save(create_test_record("Before", "b@test.com", 1, 1.0, true))
                    .await
                    .unwrap();

                saved.name = "After".to_string();
                saved.is_deleted = true;
                let replaced = repo.save(saved.clone()).await.unwrap();
                assert_eq!(replaced.id, saved.id);

                assert_eq!(repo.count().await.unwrap(), 1);
                let found = repo.find_one_by_id(&saved.id.unwrap()).await.unwrap().unwrap();
                assert_eq!(found.name, "After");
                assert!(found.is_deleted);
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let repo = $factory;
                let saved = repo
                    .save(create_test_record("Gone", "g@test.com", 1, 1.0, true))
                    .await
                    .unwrap();
                let id = saved.id.unwrap();

                assert_eq!(repo.delete(&id).await.unwrap(), 1);
                assert!(repo.find_one_by_id(&id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let repo = $factory;
                assert_eq!(repo.delete(&Uuid::new_v4()).await.unwrap(), 0);
            }

            // ==================================================================
            // Paging and counting
            // ==================================================================

            #[tokio::test]
            async fn test_find_and_count_window() {
                let repo = $factory;
                for i in 0..5 {
                    repo.save(create_test_record(&format!("r{}", i), "x@test.com", i, 1.0, true))
                        .await
                        .unwrap();
                }

                let (page, total) = repo.find_and_count(2, 2).await.unwrap();
                assert_eq!(total, 5);
                let names: Vec<&str> = page.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["r2", "r3"]);

                let (page, total) = repo.find_and_count(2, 10).await.unwrap();
                assert_eq!(total, 5);
                assert!(page.is_empty());
            }

            #[tokio::test]
            async fn test_count() {
                let repo = $factory;
                assert_eq!(repo.count().await.unwrap(), 0);
                repo.save(create_test_record("a", "a@test.com", 1, 1.0, true)).await.unwrap();
                repo.save(create_test_record("b", "b@test.com", 1, 1.0, true)).await.unwrap();
                assert_eq!(repo.count().await.unwrap(), 2);
            }

            // ==================================================================
            // Search
            // ==================================================================

            async fn seeded() -> impl Repository<TestRecord> {
                let repo = $factory;
                repo.save(create_test_record("Alice", "alice@test.com", 30, 4.5, true)).await.unwrap();
                repo.save(create_test_record("Bob", "bob@test.com", 25, 3.0, false)).await.unwrap();
                repo.save(create_test_record("Carol", "carol@test.com", 30, 2.5, false)).await.unwrap();
                repo
            }

            #[tokio::test]
            async fn test_search_string_field() {
                let repo = seeded().await;
                let found = repo
                    .find_by(&SearchCriteria::new().with("email", "bob@test.com"))
                    .await
                    .unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name, "Bob");
            }

            #[tokio::test]
            async fn test_search_integer_field() {
                let repo = seeded().await;
                let found = repo.find_by(&SearchCriteria::new().with("age", "30")).await.unwrap();
                assert_eq!(found.len(), 2);
            }

            #[tokio::test]
            async fn test_search_float_field() {
                let repo = seeded().await;
                let found = repo.find_by(&SearchCriteria::new().with("score", "4.5")).await.unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name, "Alice");
            }

            #[tokio::test]
            async fn test_search_number_by_value_not_spelling() {
                let repo = seeded().await;
                for spelling in ["3", "3.0", "3.00"] {
                    let found = repo
                        .find_by(&SearchCriteria::new().with("score", spelling))
                        .await
                        .unwrap();
                    assert_eq!(found.len(), 1, "score={}", spelling);
                    assert_eq!(found[0].name, "Bob");
                }

                let found = repo.find_by(&SearchCriteria::new().with("age", "30.0")).await.unwrap();
                assert_eq!(found.len(), 2);
                let found = repo.find_by(&SearchCriteria::new().with("name", "3")).await.unwrap();
                assert!(found.is_empty());
            }

            #[tokio::test]
            async fn test_search_boolean_field() {
                let repo = seeded().await;
                let found = repo.find_by(&SearchCriteria::new().with("active", "false")).await.unwrap();
                assert_eq!(found.len(), 2);
            }

            #[tokio::test]
            async fn test_search_combined_criteria() {
                let repo = seeded().await;
                let criteria = SearchCriteria::new().with("age", "30").with("active", "false");
                let found = repo.find_by(&criteria).await.unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name, "Carol");
            }

            #[tokio::test]
            async fn test_search_no_results() {
                let repo = seeded().await;
                let found = repo.find_by(&SearchCriteria::new().with("name", "Nobody")).await.unwrap();
                assert!(found.is_empty());
            }

            #[tokio::test]
            async fn test_search_unknown_field() {
                let repo = seeded().await;
                let found = repo.find_by(&SearchCriteria::new().with("nickname", "Al")).await.unwrap();
                assert!(found.is_empty());
            }

            // ==================================================================
            // Provided methods and concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_save_many_preserves_order() {
                let repo = $factory;
                let records = vec![
                    create_test_record("one", "1@test.com", 1, 1.0, true),
                    create_test_record("two", "2@test.com", 2, 1.0, true),
                    create_test_record("three", "3@test.com", 3, 1.0, true),
                ];

                let saved = repo.save_many(records).await.unwrap();
                let names: Vec<&str> = saved.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["one", "two", "three"]);

                let mut ids: Vec<Uuid> = saved.iter().filter_map(|r| r.id).collect();
                ids.sort();
                ids.dedup();
                assert_eq!(ids.len(), 3);
            }

            #[tokio::test]
            async fn test_create_and_merge_payloads() {
                let repo = $factory;
                let record = repo.create(record_payload("Dana", 41)).unwrap();
                assert!(record.id.is_none());
                let saved = repo.save(record).await.unwrap();

                let merged = repo
                    .merge(saved.clone(), json!({"age": 42, "id": Uuid::new_v4()}))
                    .unwrap();
                assert_eq!(merged.id, saved.id);
                assert_eq!(merged.age, 42);
                assert_eq!(merged.name, "Dana");

                assert!(repo.create(json!({"name": 5})).is_err());
                let err = repo
                    .create_many(vec![record_payload("ok", 1), json!({"name": "missing fields"})])
                    .unwrap_err();
                assert!(err.to_string().starts_with("Item 1"));
            }

            #[tokio::test]
            async fn test_concurrent_saves() {
                let repo = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let repo = repo.clone();
                    handles.push(tokio::spawn(async move {
                        repo.save(create_test_record(&format!("c{}", i), "c@test.com", i, 1.0, true))
                            .await
                            .unwrap()
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }

                assert_eq!(repo.count().await.unwrap(), 10);
            }
        }
    };
}
