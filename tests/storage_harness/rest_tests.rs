//! REST integration test macro for repository backends.
//!
//! The `rest_integration_tests!` macro drives a `CrudController<TestRecord>`
//! through full HTTP round-trips:
//! JSON → HTTP request → middleware chain → handler → Repository → HTTP response → JSON.
//!
//! # Generated Tests
//!
//! - create / getById / list / count
//! - paginate windows and fallback defaults
//! - update merge, bulkCreate, bulkUpdate
//! - delete, softDelete and restore (including 404s)
//! - search by field, unknown field
//! - malformed identifiers and bodies

/// Generate a REST integration test suite for a repository backend.
///
/// `$factory` must produce an empty `impl Repository<TestRecord> + 'static`.
#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use crud::server::{CrudController, ServerBuilder};
            use serde_json::{Value, json};

            async fn make_server() -> TestServer {
                let controller = CrudController::<TestRecord>::builder($factory).build();
                let app = ServerBuilder::new()
                    .mount("/test_records", &controller)
                    .build()
                    .unwrap();
                TestServer::try_new(app).unwrap()
            }

            async fn create(server: &TestServer, name: &str, age: i64) -> Value {
                let response = server.post("/test_records").json(&record_payload(name, age)).await;
                response.assert_status(StatusCode::CREATED);
                response.json()
            }

            // ==============================================================
            // Create / read
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_then_get() {
                let server = make_server().await;
                let created = create(&server, "Alice", 30).await;

                let id = created["id"].as_str().unwrap();
                uuid::Uuid::parse_str(id).unwrap();
                assert_eq!(created["name"], "Alice");
                assert_eq!(created["isDeleted"], false);

                let response = server.get(&format!("/test_records/{}", id)).await;
                response.assert_status(StatusCode::OK);
                let fetched: Value = response.json();
                assert_eq!(fetched, created);
            }

            #[tokio::test]
            async fn test_rest_get_not_found() {
                let server = make_server().await;
                let response = server
                    .get(&format!("/test_records/{}", uuid::Uuid::new_v4()))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
                response.assert_json(&json!({"message": "Entity not found"}));
            }

            #[tokio::test]
            async fn test_rest_get_malformed_id() {
                let server = make_server().await;
                let response = server.get("/test_records/not-a-uuid").await;
                response.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_list_and_count() {
                let server = make_server().await;
                create(&server, "a", 1).await;
                create(&server, "b", 2).await;

                let response = server.get("/test_records").await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body.as_array().unwrap().len(), 2);
                assert_eq!(body[0]["name"], "a");

                let response = server.get("/test_records/count").await;
                response.assert_status(StatusCode::OK);
                response.assert_json(&json!({"count": 2}));
            }

            // ==============================================================
            // Pagination
            // ==============================================================

            #[tokio::test]
            async fn test_rest_paginate() {
                let server = make_server().await;
                for name in ["p1", "p2", "p3"] {
                    create(&server, name, 1).await;
                }

                let response = server.get("/test_records/paginate?page=1&limit=2").await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["data"].as_array().unwrap().len(), 2);
                assert_eq!(body["total"], 3);
                assert_eq!(body["page"], 1);
                assert_eq!(body["last_page"], 2);

                let body: Value = server.get("/test_records/paginate?page=2&limit=2").await.json();
                assert_eq!(body["data"].as_array().unwrap().len(), 1);
                assert_eq!(body["data"][0]["name"], "p3");
                assert_eq!(body["page"], 2);
            }

            #[tokio::test]
            async fn test_rest_paginate_fallback_defaults() {
                let server = make_server().await;
                for name in ["d1", "d2", "d3"] {
                    create(&server, name, 1).await;
                }

                let response = server.get("/test_records/paginate?page=abc&limit=0").await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["page"], 1);
                assert_eq!(body["data"].as_array().unwrap().len(), 3);
                assert_eq!(body["last_page"], 1);
            }

            // ==============================================================
            // Updates
            // ==============================================================

            #[tokio::test]
            async fn test_rest_update_merges_fields() {
                let server = make_server().await;
                let created = create(&server, "Merge", 20).await;
                let id = created["id"].as_str().unwrap();

                let response = server
                    .put(&format!("/test_records/{}", id))
                    .json(&json!({"age": 21}))
                    .await;
                response.assert_status(StatusCode::OK);
                let updated: Value = response.json();
                assert_eq!(updated["id"], id);
                assert_eq!(updated["age"], 21);
                assert_eq!(updated["name"], "Merge");

                let fetched: Value = server.get(&format!("/test_records/{}", id)).await.json();
                assert_eq!(fetched["age"], 21);
            }

            #[tokio::test]
            async fn test_rest_update_not_found() {
                let server = make_server().await;
                let response = server
                    .put(&format!("/test_records/{}", uuid::Uuid::new_v4()))
                    .json(&json!({"age": 1}))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_bulk_create() {
                let server = make_server().await;
                let response = server
                    .post("/test_records/bulk-create")
                    .json(&json!([
                        record_payload("b1", 1),
                        record_payload("b2", 2),
                        record_payload("b3", 3)
                    ]))
                    .await;
                response.assert_status(StatusCode::CREATED);

                let body: Value = response.json();
                let items = body.as_array().unwrap();
                let names: Vec<&str> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
                assert_eq!(names, vec!["b1", "b2", "b3"]);

                let mut ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
                ids.sort();
                ids.dedup();
                assert_eq!(ids.len(), 3);

                server.get("/test_records/count").await.assert_json(&json!({"count": 3}));
            }

            #[tokio::test]
            async fn test_rest_bulk_create_requires_array() {
                let server = make_server().await;
                let response = server
                    .post("/test_records/bulk-create")
                    .json(&record_payload("single", 1))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["message"], "Invalid request body");

                server.get("/test_records/count").await.assert_json(&json!({"count": 0}));
            }

            #[tokio::test]
            async fn test_rest_bulk_update() {
                let server = make_server().await;
                let mut first = create(&server, "u1", 1).await;
                let mut second = create(&server, "u2", 2).await;
                first["age"] = json!(10);
                second["name"] = json!("u2-renamed");

                let response = server
                    .put("/test_records/bulk-update")
                    .json(&json!([first.clone(), second.clone()]))
                    .await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body[0], first);
                assert_eq!(body[1], second);

                let fetched: Value = server
                    .get(&format!("/test_records/{}", second["id"].as_str().unwrap()))
                    .await
                    .json();
                assert_eq!(fetched["name"], "u2-renamed");
                server.get("/test_records/count").await.assert_json(&json!({"count": 2}));
            }

            #[tokio::test]
            async fn test_rest_bulk_update_merges_partial_elements() {
                let server = make_server().await;
                let stored = create(&server, "kept", 1).await;

                let response = server
                    .put("/test_records/bulk-update")
                    .json(&json!([
                        {"id": stored["id"].clone(), "age": 99},
                        record_payload("fresh", 5)
                    ]))
                    .await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();

                assert_eq!(body[0]["id"], stored["id"]);
                assert_eq!(body[0]["name"], "kept");
                assert_eq!(body[0]["email"], stored["email"]);
                assert_eq!(body[0]["age"], 99);
                assert_eq!(body[1]["name"], "fresh");
                assert!(body[1]["id"].is_string());
                assert_ne!(body[1]["id"], stored["id"]);

                let fetched: Value = server
                    .get(&format!("/test_records/{}", stored["id"].as_str().unwrap()))
                    .await
                    .json();
                assert_eq!(fetched["name"], "kept");
                assert_eq!(fetched["age"], 99);
                server.get("/test_records/count").await.assert_json(&json!({"count": 2}));
            }

            // ==============================================================
            // Deletes
            // ==============================================================

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;
                let created = create(&server, "Doomed", 1).await;
                let path = format!("/test_records/{}", created["id"].as_str().unwrap());

                let response = server.delete(&path).await;
                response.assert_status(StatusCode::OK);
                response.assert_json(&json!({"message": "Entity deleted"}));

                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
                server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_soft_delete_and_restore() {
                let server = make_server().await;
                let created = create(&server, "Phoenix", 1).await;
                let id = created["id"].as_str().unwrap();

                let response = server.delete(&format!("/test_records/soft-delete/{}", id)).await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["isDeleted"], true);

                let fetched: Value = server.get(&format!("/test_records/{}", id)).await.json();
                assert_eq!(fetched["isDeleted"], true);

                let response = server.put(&format!("/test_records/restore/{}", id)).await;
                response.assert_status(StatusCode::OK);
                let restored: Value = response.json();
                assert_eq!(restored, created);
            }

            #[tokio::test]
            async fn test_rest_soft_delete_and_restore_not_found() {
                let server = make_server().await;
                let id = uuid::Uuid::new_v4();

                server
                    .delete(&format!("/test_records/soft-delete/{}", id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                server
                    .put(&format!("/test_records/restore/{}", id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Search
            // ==============================================================

            #[tokio::test]
            async fn test_rest_search() {
                let server = make_server().await;
                create(&server, "Needle", 7).await;
                create(&server, "Hay", 8).await;
                create(&server, "Hay", 9).await;

                let body: Value = server.get("/test_records/search?name=Hay").await.json();
                assert_eq!(body.as_array().unwrap().len(), 2);

                let body: Value = server.get("/test_records/search?name=Hay&age=9").await.json();
                assert_eq!(body.as_array().unwrap().len(), 1);

                let response = server.get("/test_records/search?color=blue").await;
                response.assert_status(StatusCode::OK);
                response.assert_json(&json!([]));
            }
        }
    };
}
