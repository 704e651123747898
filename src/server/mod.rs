//! HTTP layer: CRUD controllers and the server builder

pub mod builder;
pub mod controller;

pub use builder::ServerBuilder;
pub use controller::{CrudController, CrudControllerBuilder};
