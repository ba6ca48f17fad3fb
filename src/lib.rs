pub mod auth;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod operations;
pub mod resources;
pub mod routes;
pub mod validation;

pub use auth::AuthContext;
pub use errors::ApiError;
pub use filtering::{FilterSpec, QueryPlan};
pub use models::{Page, PaginationMeta, ParameterMap};
pub use routes::router;
