use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

use super::plan::column_expr;

// Basic safety limits
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Escape LIKE wildcards to prevent wildcard injection attacks
/// Escapes: % (match any) and _ (match single char)
fn escape_like_wildcards(input: &str) -> String {
    // Backslash first
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Normalize a search term: trimmed, length-capped. Blank terms yield `None`.
fn sanitize_term(term: &str) -> Option<String> {
    let trimmed: String = term.trim().chars().take(MAX_SEARCH_QUERY_LENGTH).collect();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Build condition for a column with case-insensitive substring matching:
/// `UPPER(column) LIKE '%TERM%' ESCAPE '\'`.
#[must_use]
pub fn build_like_condition<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like_wildcards(term).to_uppercase());
    Expr::expr(Func::upper(column_expr(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// OR-combined substring match across `columns`, optionally extended with
/// one extra alternative (typically an `EXISTS` over a related entity, built
/// from the sanitized term).
#[must_use]
pub fn build_search_condition<C, F>(columns: &[C], term: &str, related: F) -> Option<Condition>
where
    C: ColumnTrait,
    F: FnOnce(&str) -> Option<SimpleExpr>,
{
    let term = sanitize_term(term)?;
    let mut any = Condition::any();
    for column in columns {
        any = any.add(build_like_condition(*column, &term));
    }
    if let Some(related) = related(&term) {
        any = any.add(related);
    }
    Some(any)
}
