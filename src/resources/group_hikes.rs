//! Group hike listings.
//!
//! The public variant adds slug-based relation filters and price filters,
//! and never lets the caller choose the status or the organizer.

use std::sync::LazyLock;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, Order};

use crate::auth::capability;
use crate::entities::{company, group_hike, region, trail};
use crate::filtering::conditions::{at_least, at_most, date_from, date_to, multi_id, multi_value, parse_bool};
use crate::filtering::plan::QueryPlan;
use crate::filtering::relations::{belongs_to_slug, related_exists};
use crate::filtering::search::{build_like_condition, build_search_condition};
use crate::filtering::spec::{FilterScope, FilterSpec};

type Plan = QueryPlan<group_hike::Entity>;

pub const STATUSES: [&str; 4] = ["draft", "published", "cancelled", "completed"];

pub static GROUP_HIKE_FILTERS: LazyLock<FilterSpec<group_hike::Entity>> = LazyLock::new(|| {
    FilterSpec::builder("group_hikes", group_hike::Column::Id)
        .filter("search", search)
        .filter("status", status)
        .filter("organizer_id", organizer_id)
        .filter("company_id", company_id)
        .filter("trail_id", trail_id)
        .filter("region_id", region_id)
        .filter("date_from", filter_date_from)
        .filter("date_to", filter_date_to)
        .filter("is_featured", is_featured)
        .sortable([
            ("title", group_hike::Column::Title),
            ("start_date", group_hike::Column::StartDate),
            ("price", group_hike::Column::Price),
            ("created_at", group_hike::Column::CreatedAt),
        ])
        .default_sort(group_hike::Column::StartDate, Order::Asc)
        .owner("organizer_id", group_hike::Column::OrganizerId, capability::VIEW_ALL_GROUP_HIKES)
        .range("date_from", "date_to")
        .build()
});

pub static PUBLIC_GROUP_HIKE_FILTERS: LazyLock<FilterSpec<group_hike::Entity>> = LazyLock::new(|| {
    GROUP_HIKE_FILTERS
        .derive("public_group_hikes")
        .filter("company", company)
        .filter("trail", trail)
        .filter("region", region)
        .filter("min_price", min_price)
        .filter("max_price", max_price)
        .filter("is_free", is_free)
        .disable(["status", "organizer_id"])
        .without_owner()
        .range("min_price", "max_price")
        .build()
});

/// Published hikes starting on or after `today`.
pub fn public_scope(plan: &mut Plan, today: NaiveDate) {
    plan.and_where(group_hike::Column::Status.eq("published"))
        .and_where(group_hike::Column::StartDate.gte(today));
}

fn search(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(build_search_condition(
        &[group_hike::Column::Title, group_hike::Column::Description],
        value,
        |term| {
            Some(related_exists(
                group_hike::Column::TrailId,
                trail::Column::Id,
                Condition::all().add(build_like_condition(trail::Column::Name, term)),
            ))
        },
    ));
}

fn status(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(group_hike::Column::Status, value, Some(&STATUSES)));
}

fn organizer_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(group_hike::Column::OrganizerId, value));
}

fn company_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(group_hike::Column::CompanyId, value));
}

fn trail_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(group_hike::Column::TrailId, value));
}

fn region_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(group_hike::Column::RegionId, value));
}

fn filter_date_from(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(date_from(group_hike::Column::StartDate, value));
}

fn filter_date_to(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(date_to(group_hike::Column::StartDate, value));
}

fn is_featured(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where(group_hike::Column::IsFeatured.eq(parse_bool(value)));
}

fn company(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(belongs_to_slug(
        group_hike::Column::CompanyId,
        company::Column::Id,
        company::Column::Slug,
        value,
    ));
}

fn trail(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(belongs_to_slug(
        group_hike::Column::TrailId,
        trail::Column::Id,
        trail::Column::Slug,
        value,
    ));
}

fn region(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(belongs_to_slug(
        group_hike::Column::RegionId,
        region::Column::Id,
        region::Column::Slug,
        value,
    ));
}

fn min_price(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(at_least(group_hike::Column::Price, value));
}

fn max_price(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(at_most(group_hike::Column::Price, value));
}

/// Free means no price or a zero price.
fn is_free(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    if parse_bool(value) {
        plan.and_where(
            Condition::any()
                .add(group_hike::Column::Price.is_null())
                .add(group_hike::Column::Price.eq(0.0)),
        );
    } else {
        plan.and_where(group_hike::Column::Price.gt(0.0));
    }
}
