//! Generic CRUD controller
//!
//! [`CrudController<T>`] binds the twelve [`Operation`]s to their routes,
//! wraps each one with the configured [`CrudMiddleware`] providers and runs
//! it against a [`Repository<T>`]:
//!
//! | Verb   | Path               | Operation    | Success            |
//! |--------|--------------------|--------------|--------------------|
//! | GET    | `/`                | `list`       | 200 array          |
//! | GET    | `/paginate`        | `paginate`   | 200 page           |
//! | GET    | `/search`          | `search`     | 200 array          |
//! | GET    | `/count`           | `count`      | 200 `{count}`      |
//! | GET    | `/{id}`            | `getById`    | 200 entity         |
//! | POST   | `/`                | `create`     | 201 entity         |
//! | POST   | `/bulk-create`     | `bulkCreate` | 201 array          |
//! | PUT    | `/{id}`            | `update`     | 200 entity         |
//! | PUT    | `/bulk-update`     | `bulkUpdate` | 200 array          |
//! | PUT    | `/restore/{id}`    | `restore`    | 200 entity         |
//! | DELETE | `/{id}`            | `delete`     | 200 `{message}`    |
//! | DELETE | `/soft-delete/{id}`| `softDelete` | 200 entity         |
//!
//! Literal segments win over `{id}`, so `GET /count` never reaches `getById`.

use crate::config::{CrudConfig, PaginationConfig};
use crate::core::entity::{Entity, ID_FIELD};
use crate::core::error::CrudError;
use crate::core::middleware::{CrudMiddleware, dispatch};
use crate::core::operation::Operation;
use crate::core::query::{CountResponse, PaginatedResponse, PaginationQuery, SearchCriteria};
use crate::core::repository::Repository;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Json;
use axum::routing::{self, MethodRouter};
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state of every route of one controller
struct ControllerState<T: Entity> {
    repository: Arc<dyn Repository<T>>,
    pagination: PaginationConfig,
}

type SharedState<T> = Arc<ControllerState<T>>;

/// Generic CRUD handler for entity type `T`
///
/// The route table is built once at construction; [`routes`](Self::routes)
/// hands out clones of it.
///
/// # Example
///
/// ```rust,ignore
/// let companies = CrudController::builder(InMemoryRepository::<Company>::new())
///     .with_middleware(RequestValidator::<NewCompany>::new())
///     .build();
///
/// let app = Router::new().nest("/companies", companies.routes());
/// ```
pub struct CrudController<T: Entity> {
    router: Router,
    middleware_count: usize,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> CrudController<T> {
    /// Create a controller with the default configuration
    pub fn new(
        repository: Arc<dyn Repository<T>>,
        middlewares: Vec<Arc<dyn CrudMiddleware>>,
    ) -> Self {
        Self::with_config(repository, middlewares, &CrudConfig::default())
    }

    pub fn builder<R: Repository<T> + 'static>(repository: R) -> CrudControllerBuilder<T> {
        CrudControllerBuilder::new(Arc::new(repository))
    }

    fn with_config(
        repository: Arc<dyn Repository<T>>,
        middlewares: Vec<Arc<dyn CrudMiddleware>>,
        config: &CrudConfig,
    ) -> Self {
        let state = Arc::new(ControllerState {
            repository,
            pagination: config.pagination,
        });

        let mut router: Router<SharedState<T>> = Router::new();
        for operation in Operation::ALL {
            router = router.route(operation.path(), chained_route::<T>(operation, &middlewares));
        }

        tracing::debug!(
            resource = T::resource_name(),
            middlewares = middlewares.len(),
            "CRUD routes registered"
        );

        Self {
            router: router
                .layer(DefaultBodyLimit::max(config.max_body_bytes))
                .with_state(state),
            middleware_count: middlewares.len(),
            _entity: PhantomData,
        }
    }

    /// The route table, ready to be nested under a base path
    pub fn routes(&self) -> Router {
        self.router.clone()
    }

    pub fn resource_name(&self) -> &'static str {
        T::resource_name()
    }

    /// Number of middleware providers in the chain
    pub fn middleware_count(&self) -> usize {
        self.middleware_count
    }
}

/// Builder for [`CrudController`]
pub struct CrudControllerBuilder<T: Entity> {
    repository: Arc<dyn Repository<T>>,
    middlewares: Vec<Arc<dyn CrudMiddleware>>,
    config: CrudConfig,
}

impl<T: Entity> CrudControllerBuilder<T> {
    pub fn new(repository: Arc<dyn Repository<T>>) -> Self {
        Self {
            repository,
            middlewares: Vec::new(),
            config: CrudConfig::default(),
        }
    }

    /// Append a provider to the chain; providers run in the order added
    pub fn with_middleware(mut self, middleware: impl CrudMiddleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Append an already shared provider
    pub fn with_shared_middleware(mut self, middleware: Arc<dyn CrudMiddleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> CrudController<T> {
        CrudController::with_config(self.repository, self.middlewares, &self.config)
    }
}

/// Core handler of `operation` wrapped by every provider intercepting it.
///
/// Layers are applied last provider first, so `middlewares[0]` ends up
/// outermost and runs first.
fn chained_route<T: Entity>(
    operation: Operation,
    middlewares: &[Arc<dyn CrudMiddleware>],
) -> MethodRouter<SharedState<T>> {
    let mut route = core_route::<T>(operation);

    for provider in middlewares.iter().rev() {
        if !provider.intercepts(operation) {
            continue;
        }
        let provider = provider.clone();
        route = route.layer(axum::middleware::from_fn(
            move |request: Request, next: Next| dispatch(provider.clone(), operation, request, next),
        ));
    }

    route
}

fn core_route<T: Entity>(operation: Operation) -> MethodRouter<SharedState<T>> {
    match operation {
        Operation::List => routing::get(list::<T>),
        Operation::Paginate => routing::get(paginate::<T>),
        Operation::Search => routing::get(search::<T>),
        Operation::Count => routing::get(count::<T>),
        Operation::GetById => routing::get(get_by_id::<T>),
        Operation::Create => routing::post(create::<T>),
        Operation::BulkCreate => routing::post(bulk_create::<T>),
        Operation::Update => routing::put(update::<T>),
        Operation::BulkUpdate => routing::put(bulk_update::<T>),
        Operation::Restore => routing::put(restore::<T>),
        Operation::Delete => routing::delete(remove::<T>),
        Operation::SoftDelete => routing::delete(soft_delete::<T>),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn repository_error<T: Entity>(operation: Operation, error: anyhow::Error) -> CrudError {
    tracing::error!(
        resource = T::resource_name(),
        operation = %operation,
        "Repository failure: {:#}",
        error
    );
    CrudError::Internal(error)
}

/// A malformed identifier cannot name a stored entity
fn parse_id(raw: &str) -> Result<Uuid, CrudError> {
    Uuid::parse_str(raw).map_err(|_| CrudError::NotFound)
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, CrudError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            CrudError::from_body_rejection(rejection.status(), rejection.body_text())
        })
}

fn payload_id(payload: &Value) -> Option<Uuid> {
    payload
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

fn json_array(payload: Result<Json<Value>, JsonRejection>) -> Result<Vec<Value>, CrudError> {
    match json_body(payload)? {
        Value::Array(items) => Ok(items),
        _ => Err(CrudError::InvalidBody("expected a JSON array".to_string())),
    }
}

async fn load<T: Entity>(
    state: &ControllerState<T>,
    operation: Operation,
    id: &Uuid,
) -> Result<T, CrudError> {
    state
        .repository
        .find_one_by_id(id)
        .await
        .map_err(|e| repository_error::<T>(operation, e))?
        .ok_or(CrudError::NotFound)
}

async fn save<T: Entity>(
    state: &ControllerState<T>,
    operation: Operation,
    entity: T,
) -> Result<T, CrudError> {
    state
        .repository
        .save(entity)
        .await
        .map_err(|e| repository_error::<T>(operation, e))
}

// =============================================================================
// Core handlers
// =============================================================================

async fn list<T: Entity>(State(state): State<SharedState<T>>) -> Result<Json<Vec<T>>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "list", "Listing entities");

    let entities = state
        .repository
        .find()
        .await
        .map_err(|e| repository_error::<T>(Operation::List, e))?;
    Ok(Json(entities))
}

async fn paginate<T: Entity>(
    State(state): State<SharedState<T>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<T>>, CrudError> {
    let pagination = query.resolve(&state.pagination);
    tracing::debug!(
        resource = T::resource_name(),
        operation = "paginate",
        page = pagination.page,
        limit = pagination.limit,
        "Paginating entities"
    );

    let (data, total) = state
        .repository
        .find_and_count(pagination.take(), pagination.skip())
        .await
        .map_err(|e| repository_error::<T>(Operation::Paginate, e))?;

    Ok(Json(PaginatedResponse::new(data, total, pagination)))
}

async fn get_by_id<T: Entity>(
    State(state): State<SharedState<T>>,
    Path(id): Path<String>,
) -> Result<Json<T>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "getById", id = %id, "Fetching entity");

    let id = parse_id(&id)?;
    Ok(Json(load(&state, Operation::GetById, &id).await?))
}

async fn create<T: Entity>(
    State(state): State<SharedState<T>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "create", "Creating entity");

    let entity = state
        .repository
        .create(json_body(payload)?)
        .map_err(|e| CrudError::InvalidBody(format!("{:#}", e)))?;
    let saved = save(&state, Operation::Create, entity).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn bulk_create<T: Entity>(
    State(state): State<SharedState<T>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<T>>), CrudError> {
    let payloads = json_array(payload)?;
    tracing::debug!(
        resource = T::resource_name(),
        operation = "bulkCreate",
        count = payloads.len(),
        "Creating entities"
    );

    let entities = state
        .repository
        .create_many(payloads)
        .map_err(|e| CrudError::InvalidBody(format!("{:#}", e)))?;
    let saved = state
        .repository
        .save_many(entities)
        .await
        .map_err(|e| repository_error::<T>(Operation::BulkCreate, e))?;

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update<T: Entity>(
    State(state): State<SharedState<T>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<T>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "update", id = %id, "Updating entity");

    let id = parse_id(&id)?;
    let payload = json_body(payload)?;
    let existing = load(&state, Operation::Update, &id).await?;

    let merged = state
        .repository
        .merge(existing, payload)
        .map_err(|e| CrudError::InvalidBody(format!("{:#}", e)))?;

    Ok(Json(save(&state, Operation::Update, merged).await?))
}

async fn bulk_update<T: Entity>(
    State(state): State<SharedState<T>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<T>>, CrudError> {
    let payloads = json_array(payload)?;
    tracing::debug!(
        resource = T::resource_name(),
        operation = "bulkUpdate",
        count = payloads.len(),
        "Saving entities"
    );

    // Elements naming a stored entity are merged onto it, the rest are created
    let mut entities = Vec::with_capacity(payloads.len());
    for (index, payload) in payloads.into_iter().enumerate() {
        let existing = match payload_id(&payload) {
            Some(id) => state
                .repository
                .find_one_by_id(&id)
                .await
                .map_err(|e| repository_error::<T>(Operation::BulkUpdate, e))?,
            None => None,
        };
        let entity = match existing {
            Some(existing) => state.repository.merge(existing, payload),
            None => state.repository.create(payload),
        }
        .map_err(|e| CrudError::InvalidBody(format!("Item {}: {:#}", index, e)))?;
        entities.push(entity);
    }

    let saved = state
        .repository
        .save_many(entities)
        .await
        .map_err(|e| repository_error::<T>(Operation::BulkUpdate, e))?;

    Ok(Json(saved))
}

async fn remove<T: Entity>(
    State(state): State<SharedState<T>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "delete", id = %id, "Deleting entity");

    let id = parse_id(&id)?;
    let affected = state
        .repository
        .delete(&id)
        .await
        .map_err(|e| repository_error::<T>(Operation::Delete, e))?;

    if affected == 0 {
        return Err(CrudError::NotFound);
    }
    Ok(Json(json!({ "message": "Entity deleted" })))
}

async fn soft_delete<T: Entity>(
    State(state): State<SharedState<T>>,
    Path(id): Path<String>,
) -> Result<Json<T>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "softDelete", id = %id, "Soft-deleting entity");

    let id = parse_id(&id)?;
    let mut entity = load(&state, Operation::SoftDelete, &id).await?;
    entity.set_deleted(true);

    Ok(Json(save(&state, Operation::SoftDelete, entity).await?))
}

async fn restore<T: Entity>(
    State(state): State<SharedState<T>>,
    Path(id): Path<String>,
) -> Result<Json<T>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "restore", id = %id, "Restoring entity");

    let id = parse_id(&id)?;
    let mut entity = load(&state, Operation::Restore, &id).await?;
    entity.set_deleted(false);

    Ok(Json(save(&state, Operation::Restore, entity).await?))
}

async fn search<T: Entity>(
    State(state): State<SharedState<T>>,
    Query(criteria): Query<SearchCriteria>,
) -> Result<Json<Vec<T>>, CrudError> {
    tracing::debug!(
        resource = T::resource_name(),
        operation = "search",
        criteria = ?criteria,
        "Searching entities"
    );

    let entities = state
        .repository
        .find_by(&criteria)
        .await
        .map_err(|e| repository_error::<T>(Operation::Search, e))?;
    Ok(Json(entities))
}

async fn count<T: Entity>(
    State(state): State<SharedState<T>>,
) -> Result<Json<CountResponse>, CrudError> {
    tracing::debug!(resource = T::resource_name(), operation = "count", "Counting entities");

    let count = state
        .repository
        .count()
        .await
        .map_err(|e| repository_error::<T>(Operation::Count, e))?;
    Ok(Json(CountResponse { count }))
}
