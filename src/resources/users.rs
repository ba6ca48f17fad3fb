use std::sync::LazyLock;

use sea_orm::Order;

use crate::auth::capability;
use crate::entities::{user, user_role};
use crate::filtering::conditions::{created_after, created_before, multi_id, multi_value};
use crate::filtering::permissions;
use crate::filtering::plan::QueryPlan;
use crate::filtering::relations::has_any_related;
use crate::filtering::search::build_search_condition;
use crate::filtering::spec::{FilterScope, FilterSpec};

type Plan = QueryPlan<user::Entity>;

pub const STATUSES: [&str; 3] = ["active", "inactive", "suspended"];

pub static USER_FILTERS: LazyLock<FilterSpec<user::Entity>> = LazyLock::new(|| {
    FilterSpec::builder("users", user::Column::Id)
        .filter("search", search)
        .filter("status", status)
        .filter("role_id", role_id)
        .filter("company_id", company_id)
        .filter("created_by", created_by)
        .filter("created_after", filter_created_after)
        .filter("created_before", filter_created_before)
        .filter("trashed", permissions::trashed)
        .sortable([
            ("name", user::Column::Name),
            ("email", user::Column::Email),
            ("status", user::Column::Status),
            ("created_at", user::Column::CreatedAt),
        ])
        .default_sort(user::Column::CreatedAt, Order::Desc)
        .soft_deletes(user::Column::DeletedAt, capability::DELETE_USERS)
        .owner("created_by", user::Column::CreatedBy, capability::VIEW_ALL_USERS)
        .build()
});

fn search(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(build_search_condition(
        &[user::Column::Name, user::Column::Email],
        value,
        |_| None,
    ));
}

fn status(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_value(user::Column::Status, value, Some(&STATUSES)));
}

/// Users holding any of the listed roles.
fn role_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(has_any_related(
        user::Column::Id,
        user_role::Column::UserId,
        user_role::Column::RoleId,
        value,
    ));
}

fn company_id(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(user::Column::CompanyId, value));
}

fn created_by(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(multi_id(user::Column::CreatedBy, value));
}

fn filter_created_after(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_after(user::Column::CreatedAt, value));
}

fn filter_created_before(plan: &mut Plan, value: &str, _: &FilterScope<'_>) {
    plan.and_where_option(created_before(user::Column::CreatedAt, value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::models::parameter_map;
    use sea_orm::DbBackend;

    #[test]
    fn test_role_filter_is_a_single_exists() {
        let sql = USER_FILTERS
            .plan(&parameter_map([("role_id", "1,2,x")]), &AuthContext::guest())
            .to_sql(DbBackend::Sqlite);
        assert_eq!(sql.matches("EXISTS").count(), 1, "{sql}");
        assert!(sql.contains(r#""user_roles"."role_id" IN (1, 2)"#), "{sql}");
        assert!(sql.contains(r#""user_roles"."user_id" = "users"."id""#), "{sql}");
    }

    #[test]
    fn test_search_covers_email() {
        let sql = USER_FILTERS
            .plan(&parameter_map([("search", "@example")]), &AuthContext::guest())
            .to_sql(DbBackend::Sqlite);
        assert!(sql.contains(r#"UPPER("users"."email") LIKE"#), "{sql}");
    }
}
