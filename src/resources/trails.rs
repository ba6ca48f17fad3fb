//! Trail listings: the admin specification and its public derivative.

use std::sync::LazyLock;

use sea_orm::{ColumnTrait, Condition, Order};

use crate::auth::capability;
use crate::entities::{region, trail, trail_amenity};
use crate::filtering::conditions::{
    at_least, at_most, created_after, created_before, multi_id, multi_value, parse_bool, parse_number,
};
use crate::filtering::duration::{DurationColumns, max_duration, min_duration, multi_day};
use crate::filtering::geo::{BoundingBox, GeoColumns, GeoPoint, apply_proximity, bounding_box_condition, clamp_radius};
use crate::filtering::permissions;
use crate::filtering::plan::QueryPlan;
use crate::filtering::relations::{belongs_to_slug, has_all_related, has_any_related, related_exists};
use crate::filtering::search::{build_like_condition, build_search_condition};
use crate::filtering::spec::{FilterScope, FilterSpec};

type Plan = QueryPlan<trail::Entity>;

pub const STATUSES: [&str; 3] = ["draft", "published", "archived"];
pub const DIFFICULTIES: [&str; 4] = ["easy", "moderate", "hard", "expert"];
pub const DURATION_TYPES: [&str; 2] = ["hours", "days"];

const DURATION: DurationColumns<trail::Column> = DurationColumns {
    unit: trail::Column::DurationType,
    min: trail::Column::DurationMin,
    max: trail::Column::DurationMax,
};

const COORDINATES: GeoColumns<trail::Column> = GeoColumns {
    lat: trail::Column::Latitude,
    lng: trail::Column::Longitude,
};

pub static TRAIL_FILTERS: LazyLock<FilterSpec<trail::Entity>> = LazyLock::new(|| {
    FilterSpec::builder("trails", trail::Column::Id)
        .filter("search", search)
        .filter("status", status)
        .filter("difficulty", difficulty)
        .filter("region", region)
        .filter("region_id", region_id)
        .filter("created_by", created_by)
        .filter("created_after", filter_created_after)
        .filter("created_before", filter_created_before)
        .filter("trashed", permissions::trashed)
        .filter("amenities", amenities)
        .filter("amenities_any", amenities_any)
        .filter("min_distance", min_distance)
        .filter("max_distance", max_distance)
        .filter("min_duration", filter_min_duration)
        .filter("max_duration", filter_max_duration)
        .filter("duration_type", duration_type)
        .filter("is_multi_day", is_multi_day)
        .filter("bounds", bounds)
        .filter("near_lat", near)
        .sortable([
            ("name", trail::Column::Name),
            ("difficulty", trail::Column::Difficulty),
            ("distance_km", trail::Column::DistanceKm),
            ("duration_min", trail::Column::DurationMin),
            ("status", trail::Column::Status),
            ("created_at", trail::Column::CreatedAt),
        ])
        .default_sort(trail::Column::CreatedAt, Order::Desc)
        .soft_deletes(trail::Column::DeletedAt, capability::DELETE_TRAILS)
        .owner("created_by", trail::Column::CreatedBy, capability::VIEW_ALL_TRAILS)
        .range("min_distance", "max_distance")
        .range("min_duration", "max_duration")
        .build()
});

/// Anonymous listing: status, authorship and trashed visibility are not
/// caller-controlled.
pub static PUBLIC_TRAIL_FILTERS: LazyLock<FilterSpec<trail::Entity>> = LazyLock::new(|| {
    TRAIL_FILTERS
        .derive("public_trails")
        .disable(["status", "created_by", "trashed"])
        .without_owner()
        .build()
});

/// Constraints the public endpoint always applies.
pub fn public_scope(plan: &mut Plan) {
    plan.and_where(trail::Column::Status.eq("published"));
}

fn search(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(build_search_condition(
        &[trail::Column::Name, trail::Column::Description],
        value,
        |term| {
            Some(related_exists(
                trail::Column::RegionId,
                region::Column::Id,
                Condition::all().add(build_like_condition(region::Column::Name, term)),
            ))
        },
    ));
}

fn status(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(trail::Column::Status, value, Some(&STATUSES)));
}

fn difficulty(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(trail::Column::Difficulty, value, Some(&DIFFICULTIES)));
}

fn region(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(belongs_to_slug(
        trail::Column::RegionId,
        region::Column::Id,
        region::Column::Slug,
        value,
    ));
}

fn region_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(trail::Column::RegionId, value));
}

fn created_by(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(trail::Column::CreatedBy, value));
}

fn filter_created_after(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_after(trail::Column::CreatedAt, value));
}

fn filter_created_before(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_before(trail::Column::CreatedAt, value));
}

fn amenities(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(has_all_related(
        trail::Column::Id,
        trail_amenity::Column::TrailId,
        trail_amenity::Column::AmenityId,
        value,
    ));
}

fn amenities_any(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(has_any_related(
        trail::Column::Id,
        trail_amenity::Column::TrailId,
        trail_amenity::Column::AmenityId,
        value,
    ));
}

fn min_distance(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(at_least(trail::Column::DistanceKm, value));
}

fn max_distance(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(at_most(trail::Column::DistanceKm, value));
}

fn filter_min_duration(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(min_duration(DURATION, value));
}

fn filter_max_duration(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(max_duration(DURATION, value));
}

fn duration_type(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(trail::Column::DurationType, value, Some(&DURATION_TYPES)));
}

fn is_multi_day(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where(multi_day(DURATION, parse_bool(value)));
}

fn bounds(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    if let Some(bbox) = BoundingBox::parse(value) {
        plan.and_where(bounding_box_condition(COORDINATES, bbox));
    }
}

/// Registered on `near_lat`; reads `near_lng` and `radius` from the scope.
fn near(plan: &mut Plan, value: &str, scope: &FilterScope<'_>) {
    let Some(lat) = parse_number(value) else {
        return;
    };
    let Some(lng) = scope.param("near_lng").and_then(parse_number) else {
        tracing::debug!("Ignoring near_lat without a well-formed near_lng");
        return;
    };
    let radius_km = clamp_radius(scope.param("radius"));
    apply_proximity(plan, COORDINATES, GeoPoint { lat, lng }, radius_km);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::filtering::spec::FilterHandler;
    use crate::models::parameter_map;
    use sea_orm::DbBackend;

    fn sql(pairs: &[(&str, &str)]) -> String {
        TRAIL_FILTERS
            .plan(&parameter_map(pairs.iter().copied()), &AuthContext::guest())
            .to_sql(DbBackend::Postgres)
    }

    #[test]
    fn test_status_multi_value_with_allow_list() {
        let sql = sql(&[("status", "published,archived,bogus")]);
        assert!(sql.contains(r#""trails"."status" IN ('published', 'archived')"#), "{sql}");
        assert!(!sql.contains("bogus"), "{sql}");
    }

    #[test]
    fn test_search_covers_region_name() {
        let sql = sql(&[("search", "alp")]);
        assert!(sql.contains(r#"UPPER("trails"."name") LIKE"#), "{sql}");
        assert!(sql.contains(r#"UPPER("trails"."description") LIKE"#), "{sql}");
        assert!(sql.contains(r#"UPPER("regions"."name") LIKE"#), "{sql}");
        assert!(sql.contains("'%ALP%'"), "{sql}");
    }

    #[test]
    fn test_proximity_requires_both_coordinates() {
        let only_lat = sql(&[("near_lat", "47.0")]);
        assert!(!only_lat.contains("acos"), "{only_lat}");

        let only_lng = sql(&[("near_lng", "8.0")]);
        assert!(!only_lng.contains("acos"), "{only_lng}");

        let both = sql(&[("near_lat", "47.0"), ("near_lng", "8.0")]);
        assert!(both.contains("acos"), "{both}");
        assert!(both.contains("<= 25"), "{both}");
    }

    #[test]
    fn test_proximity_orders_before_requested_sort() {
        let sql = sql(&[("near_lat", "47"), ("near_lng", "8"), ("radius", "40"), ("sort", "name")]);
        let order_by = sql.split("ORDER BY").nth(1).unwrap_or_default();
        let distance = order_by.find("acos").unwrap();
        let name = order_by.find(r#""trails"."name""#).unwrap();
        assert!(distance < name, "{sql}");
        assert!(sql.contains("<= 40"), "{sql}");
    }

    #[test]
    fn test_bounds_and_proximity_combine() {
        let sql = sql(&[("bounds", "46,7,48,9"), ("near_lat", "47"), ("near_lng", "8")]);
        assert!(sql.contains(r#""trails"."latitude" BETWEEN 46 AND 48"#), "{sql}");
        assert!(sql.contains("acos"), "{sql}");
    }

    #[test]
    fn test_public_spec_disables_caller_controlled_visibility() {
        for name in ["status", "created_by", "trashed"] {
            assert!(
                matches!(PUBLIC_TRAIL_FILTERS.handler(name), Some(FilterHandler::Disabled)),
                "{name} should be disabled"
            );
        }
        assert!(PUBLIC_TRAIL_FILTERS.owner().is_none());
        assert!(TRAIL_FILTERS.owner().is_some());
        assert!(matches!(PUBLIC_TRAIL_FILTERS.handler("amenities"), Some(FilterHandler::Apply(_))));
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let sql = sql(&[]);
        assert!(
            sql.ends_with(r#"ORDER BY "trails"."created_at" DESC, "trails"."id" ASC"#),
            "{sql}"
        );
        assert!(sql.contains(r#""trails"."deleted_at" IS NULL"#), "{sql}");
    }
}
