//! Existence predicates over related tables.
//!
//! Every predicate here is a correlated `EXISTS (SELECT 1 FROM related WHERE
//! related.remote_key = owner.local_key AND ...)`. The same shape serves a
//! belongs-to (`local` is the owner's foreign key, `remote` the related
//! primary key) and a pivot table (`local` is the owner's primary key,
//! `remote` the pivot's foreign key).

use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, Query, SimpleExpr},
};

use super::conditions::{multi_value, parse_ids};
use super::plan::column_expr;

/// `EXISTS` over the table owning `remote`, correlated on
/// `remote = local` and further narrowed by `constraint`.
#[must_use]
pub fn related_exists<L, R>(local: L, remote: R, constraint: Condition) -> SimpleExpr
where
    L: ColumnTrait,
    R: ColumnTrait,
{
    Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(R::EntityName::default())
            .and_where(column_expr(remote).equals((L::EntityName::default(), local)))
            .cond_where(constraint)
            .to_owned(),
    )
}

/// ANY-of: one existence check requiring at least one pivot row whose
/// `related` id is in the list.
#[must_use]
pub fn has_any_related<L, P>(local: L, pivot_owner: P, pivot_related: P, raw: &str) -> Option<SimpleExpr>
where
    L: ColumnTrait,
    P: ColumnTrait,
{
    let ids = parse_ids(raw);
    if ids.is_empty() {
        return None;
    }
    let matching = if ids.len() == 1 {
        pivot_related.eq(ids[0])
    } else {
        pivot_related.is_in(ids)
    };
    Some(related_exists(local, pivot_owner, Condition::all().add(matching)))
}

/// ALL-of: one independent existence check per id, conjoined. A record must
/// be associated with every listed id.
#[must_use]
pub fn has_all_related<L, P>(local: L, pivot_owner: P, pivot_related: P, raw: &str) -> Option<Condition>
where
    L: ColumnTrait,
    P: ColumnTrait,
{
    let ids = parse_ids(raw);
    if ids.is_empty() {
        return None;
    }
    let condition = ids.into_iter().fold(Condition::all(), |all, id| {
        all.add(related_exists(
            local,
            pivot_owner,
            Condition::all().add(pivot_related.eq(id)),
        ))
    });
    Some(condition)
}

/// Belongs-to by slug: the related row referenced by `foreign_key` must have
/// one of the given slugs.
#[must_use]
pub fn belongs_to_slug<L, R>(foreign_key: L, related_key: R, slug: R, raw: &str) -> Option<SimpleExpr>
where
    L: ColumnTrait,
    R: ColumnTrait,
{
    let matching = multi_value(slug, raw, None)?;
    Some(related_exists(
        foreign_key,
        related_key,
        Condition::all().add(matching),
    ))
}
