use std::sync::LazyLock;

use sea_orm::{ColumnTrait, Order};
use uuid::Uuid;

use crate::entities::activity_log;
use crate::filtering::conditions::{created_after, created_before, multi_id, multi_value, split_values};
use crate::filtering::plan::QueryPlan;
use crate::filtering::search::build_search_condition;
use crate::filtering::spec::{FilterScope, FilterSpec};

type Plan = QueryPlan<activity_log::Entity>;

pub static ACTIVITY_LOG_FILTERS: LazyLock<FilterSpec<activity_log::Entity>> = LazyLock::new(|| {
    FilterSpec::builder("activity_logs", activity_log::Column::Id)
        .filter("search", search)
        .filter("log_name", log_name)
        .filter("event", event)
        .filter("causer_id", causer_id)
        .filter("subject_type", subject_type)
        .filter("subject_id", subject_id)
        .filter("batch_uuid", batch_uuid)
        .filter("created_after", filter_created_after)
        .filter("created_before", filter_created_before)
        .sortable([
            ("created_at", activity_log::Column::CreatedAt),
            ("log_name", activity_log::Column::LogName),
            ("event", activity_log::Column::Event),
        ])
        .default_sort(activity_log::Column::CreatedAt, Order::Desc)
        .build()
});

fn search(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(build_search_condition(
        &[activity_log::Column::Description, activity_log::Column::LogName],
        value,
        |_| None,
    ));
}

fn log_name(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(activity_log::Column::LogName, value, None));
}

fn event(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(activity_log::Column::Event, value, None));
}

fn causer_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(activity_log::Column::CauserId, value));
}

fn subject_type(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(activity_log::Column::SubjectType, value, None));
}

fn subject_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(activity_log::Column::SubjectId, value));
}

/// Entries recorded in one of the listed batches. Malformed UUIDs are dropped.
fn batch_uuid(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    let batches: Vec<Uuid> = split_values(value)
        .into_iter()
        .filter_map(|token| match Uuid::parse_str(token) {
            Ok(uuid) => Some(uuid),
            Err(_) => {
                tracing::debug!(token, "Ignoring malformed batch uuid");
                None
            }
        })
        .collect();
    match batches.len() {
        0 => {}
        1 => {
            plan.and_where(activity_log::Column::BatchUuid.eq(batches[0]));
        }
        _ => {
            plan.and_where(activity_log::Column::BatchUuid.is_in(batches));
        }
    }
}

fn filter_created_after(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_after(activity_log::Column::CreatedAt, value));
}

fn filter_created_before(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_before(activity_log::Column::CreatedAt, value));
}
