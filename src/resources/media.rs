use std::sync::LazyLock;

use sea_orm::Order;

use crate::auth::capability;
use crate::entities::media;
use crate::filtering::conditions::{created_after, created_before, multi_id, multi_value};
use crate::filtering::permissions;
use crate::filtering::plan::QueryPlan;
use crate::filtering::search::build_search_condition;
use crate::filtering::spec::{FilterScope, FilterSpec};

type Plan = QueryPlan<media::Entity>;

pub const MEDIA_TYPES: [&str; 4] = ["image", "video", "document", "audio"];

/// Media library listing, 20 per page by default.
pub static MEDIA_FILTERS: LazyLock<FilterSpec<media::Entity>> = LazyLock::new(|| {
    FilterSpec::builder("media", media::Column::Id)
        .filter("search", search)
        .filter("type", media_type)
        .filter("uploaded_by", uploaded_by)
        .filter("created_after", filter_created_after)
        .filter("created_before", filter_created_before)
        .filter("trashed", permissions::trashed)
        .sortable([
            ("name", media::Column::Name),
            ("file_name", media::Column::FileName),
            ("type", media::Column::MediaType),
            ("size", media::Column::Size),
            ("created_at", media::Column::CreatedAt),
        ])
        .default_sort(media::Column::CreatedAt, Order::Desc)
        .per_page(20)
        .soft_deletes(media::Column::DeletedAt, capability::DELETE_MEDIA)
        .owner("uploaded_by", media::Column::UploadedBy, capability::VIEW_ALL_MEDIA)
        .build()
});

fn search(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(build_search_condition(
        &[media::Column::Name, media::Column::FileName],
        value,
        |_| None,
    ));
}

fn media_type(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(media::Column::MediaType, value, Some(&MEDIA_TYPES)));
}

fn uploaded_by(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(media::Column::UploadedBy, value));
}

fn filter_created_after(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_after(media::Column::CreatedAt, value));
}

fn filter_created_before(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_before(media::Column::CreatedAt, value));
}
