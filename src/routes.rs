//! Axum list handlers for every entity collection.
//!
//! Authentication is an outer layer: it resolves the caller and inserts an
//! [`AuthContext`] request extension. Requests without one are guests.

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    routing::get,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::convert::Infallible;

use crate::auth::AuthContext;
use crate::errors::ApiError;
use crate::filtering::plan::QueryPlan;
use crate::filtering::spec::FilterSpec;
use crate::models::{Page, ParameterMap};
use crate::operations::{list, list_models};
use crate::entities::{activity_log, group_hike, media, user};
use crate::resources::{
    ACTIVITY_LOG_FILTERS, GROUP_HIKE_FILTERS, MEDIA_FILTERS, PUBLIC_GROUP_HIKE_FILTERS, PUBLIC_TRAIL_FILTERS,
    TRAIL_FILTERS, USER_FILTERS, group_hikes, trails,
};

type ListResponse<T = JsonValue> = Result<Json<Page<T>>, ApiError>;

/// The caller's [`AuthContext`], or a guest when no auth layer ran.
#[derive(Debug, Clone)]
pub struct Caller(pub AuthContext);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthContext>().cloned().unwrap_or_default()))
    }
}

async fn respond<E, F>(
    db: &DatabaseConnection,
    spec: &FilterSpec<E>,
    params: ParameterMap,
    auth: &AuthContext,
    pin: F,
) -> ListResponse
where
    E: EntityTrait,
    E::Model: Send + Sync,
    F: FnOnce(&mut QueryPlan<E>),
{
    let page = list(db, spec, params, auth, pin).await?;
    Ok(Json(page))
}

async fn respond_models<E>(
    db: &DatabaseConnection,
    spec: &FilterSpec<E>,
    params: ParameterMap,
    auth: &AuthContext,
) -> ListResponse<E::Model>
where
    E: EntityTrait,
    E::Model: Serialize + Send + Sync,
{
    let page = list_models(db, spec, params, auth).await?;
    Ok(Json(page))
}

pub async fn list_trails(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse {
    respond(&db, &TRAIL_FILTERS, params, &auth, |_| {}).await
}

pub async fn list_public_trails(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse {
    respond(&db, &PUBLIC_TRAIL_FILTERS, params, &auth, trails::public_scope).await
}

pub async fn list_group_hikes(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse<group_hike::Model> {
    respond_models(&db, &GROUP_HIKE_FILTERS, params, &auth).await
}

pub async fn list_public_group_hikes(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse {
    let today = chrono::Utc::now().date_naive();
    respond(&db, &PUBLIC_GROUP_HIKE_FILTERS, params, &auth, |plan| {
        group_hikes::public_scope(plan, today);
    })
    .await
}

pub async fn list_media(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse<media::Model> {
    respond_models(&db, &MEDIA_FILTERS, params, &auth).await
}

pub async fn list_users(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse<user::Model> {
    respond_models(&db, &USER_FILTERS, params, &auth).await
}

pub async fn list_activity_logs(
    State(db): State<DatabaseConnection>,
    Caller(auth): Caller,
    Query(params): Query<ParameterMap>,
) -> ListResponse<activity_log::Model> {
    respond_models(&db, &ACTIVITY_LOG_FILTERS, params, &auth).await
}

/// All list endpoints, admin variants under `/admin`.
pub fn router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/trails", get(list_public_trails))
        .route("/group-hikes", get(list_public_group_hikes))
        .route("/admin/trails", get(list_trails))
        .route("/admin/group-hikes", get(list_group_hikes))
        .route("/admin/media", get(list_media))
        .route("/admin/users", get(list_users))
        .route("/admin/activity-logs", get(list_activity_logs))
        .with_state(db)
}
