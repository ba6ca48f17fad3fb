//! # List operations
//!
//! The endpoint pipeline shared by every list handler:
//!
//! 1. request-shape validation (422 on failure)
//! 2. owner parameter stripping for callers without the "view all" capability
//! 3. filter dispatch and sort resolution into a [`QueryPlan`]
//! 4. the unconditional owner constraint
//! 5. endpoint pins (public variants)
//! 6. `COUNT` plus an `OFFSET`/`LIMIT` fetch
//!
//! Proximity searches on SQLite are the exception to step 6: the bounding-box
//! candidates are fetched whole, then filtered, ordered and paged in process.
//!
//! ```rust,ignore
//! let page = list(&db, &PUBLIC_TRAIL_FILTERS, params, &auth, trails::public_scope).await?;
//! ```

use sea_orm::{ConnectionTrait, DbBackend, DbErr, EntityTrait, PaginatorTrait, QuerySelect};
use serde_json::Value as JsonValue;

use crate::auth::AuthContext;
use crate::errors::ApiError;
use crate::filtering::geo::{DISTANCE_ALIAS, Proximity};
use crate::filtering::pagination::PageRequest;
use crate::filtering::plan::QueryPlan;
use crate::filtering::spec::FilterSpec;
use crate::models::{Page, PaginationMeta, ParameterMap};
use crate::validation::validate_list_params;

/// Validate `params` and turn them into a plan and a page request for
/// `auth`, owner scoping included.
pub fn prepare_list<E: EntityTrait>(
    spec: &FilterSpec<E>,
    mut params: ParameterMap,
    auth: &AuthContext,
) -> Result<(QueryPlan<E>, PageRequest), ApiError> {
    validate_list_params(spec, &params)?;

    if let Some(owner) = spec.owner() {
        owner.strip_parameter(&mut params, auth);
    }
    let mut plan = spec.plan(&params, auth);
    if let Some(owner) = spec.owner() {
        plan.and_where_option(owner.constraint(auth));
    }
    let page = spec.page_request(&params);

    tracing::debug!(
        spec = spec.name(),
        page = page.page,
        per_page = page.per_page,
        "Prepared list query"
    );
    Ok((plan, page))
}

/// The proximity search that has to run in process on this connection.
fn in_process_proximity<E: EntityTrait, C: ConnectionTrait>(db: &C, plan: &QueryPlan<E>) -> Option<Proximity<E::Column>> {
    plan.proximity().filter(|_| db.get_database_backend() == DbBackend::Sqlite)
}

/// Page over rows that are already filtered and ordered.
fn page_in_process<T>(rows: Vec<T>, request: PageRequest) -> Page<T> {
    let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
    let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(request.per_page).unwrap_or(usize::MAX);
    Page {
        data: rows.into_iter().skip(skip).take(take).collect(),
        meta: PaginationMeta::new(request, total),
    }
}

/// Count the plan's matches and fetch one page of models.
pub async fn paginate<E, C>(db: &C, plan: &QueryPlan<E>, request: PageRequest) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    if let Some(proximity) = in_process_proximity(db, plan) {
        let candidates = plan.select(backend).all(db).await?;
        let ranked = proximity.nearest_first(candidates, |model| proximity.model_point(model));
        tracing::debug!(rows = ranked.len(), "Ranked proximity candidates in process");
        let rows = ranked.into_iter().map(|(model, _)| model).collect();
        return Ok(page_in_process(rows, request));
    }

    let total = plan.select(backend).count(db).await?;
    let data = plan
        .select(backend)
        .offset(request.offset())
        .limit(request.per_page)
        .all(db)
        .await?;
    Ok(Page {
        data,
        meta: PaginationMeta::new(request, total),
    })
}

/// Like [`paginate`], but rows are returned as JSON objects so the derived
/// `distance` of a proximity search is kept.
pub async fn paginate_json<E, C>(db: &C, plan: &QueryPlan<E>, request: PageRequest) -> Result<Page<JsonValue>, DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    if let Some(proximity) = in_process_proximity(db, plan) {
        let candidates = plan.select(backend).into_json().all(db).await?;
        let ranked = proximity.nearest_first(candidates, |row| proximity.json_point(row));
        tracing::debug!(rows = ranked.len(), "Ranked proximity candidates in process");
        let rows = ranked
            .into_iter()
            .map(|(mut row, distance)| {
                if let Some(object) = row.as_object_mut() {
                    object.insert(DISTANCE_ALIAS.to_owned(), JsonValue::from(distance));
                }
                row
            })
            .collect();
        return Ok(page_in_process(rows, request));
    }

    let total = plan.select(backend).count(db).await?;
    let data = plan
        .select(backend)
        .offset(request.offset())
        .limit(request.per_page)
        .into_json()
        .all(db)
        .await?;
    Ok(Page {
        data,
        meta: PaginationMeta::new(request, total),
    })
}

/// The whole list pipeline. `pin` adds the constraints an endpoint always
/// applies regardless of the parameters.
pub async fn list<E, C, F>(
    db: &C,
    spec: &FilterSpec<E>,
    params: ParameterMap,
    auth: &AuthContext,
    pin: F,
) -> Result<Page<JsonValue>, ApiError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
    F: FnOnce(&mut QueryPlan<E>),
{
    let (mut plan, page) = prepare_list(spec, params, auth)?;
    pin(&mut plan);
    Ok(paginate_json(db, &plan, page).await?)
}

/// [`list`] for collections without derived columns: rows stay typed.
pub async fn list_models<E, C>(
    db: &C,
    spec: &FilterSpec<E>,
    params: ParameterMap,
    auth: &AuthContext,
) -> Result<Page<E::Model>, ApiError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let (plan, page) = prepare_list(spec, params, auth)?;
    Ok(paginate(db, &plan, page).await?)
}
