//! The request-scoped query plan that predicate builders add constraints to.

use sea_orm::{
    ColumnTrait, Condition, DbBackend, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait, Select,
    sea_query::{ConditionExpression, Expr, SimpleExpr},
};

use super::geo::{DISTANCE_ALIAS, Proximity, bounding_box_condition};

/// Soft-delete visibility requested through the `trashed` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrashedScope {
    /// Only records that are not soft-deleted.
    #[default]
    Exclude,
    /// Deleted and non-deleted records.
    With,
    /// Only soft-deleted records.
    Only,
}

impl TrashedScope {
    /// Parse the `trashed` parameter. Only `with` and `only` are meaningful.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "with" => Some(Self::With),
            "only" => Some(Self::Only),
            _ => None,
        }
    }
}

/// Soft-delete configuration for an entity: the `deleted_at` style column
/// and the capability a caller needs to widen visibility.
#[derive(Debug, Clone, Copy)]
pub struct SoftDelete<C> {
    pub column: C,
    pub capability: &'static str,
}

/// Qualified column expression (`"table"."column"`).
pub(crate) fn column_expr<C: ColumnTrait>(column: C) -> Expr {
    Expr::col((C::EntityName::default(), column))
}

/// Accumulates the constraints, proximity search and orderings of one list
/// request. Owned by the request that builds it and consumed on execution.
#[derive(Debug, Clone)]
pub struct QueryPlan<E: EntityTrait> {
    condition: Condition,
    proximity: Option<Proximity<E::Column>>,
    orderings: Vec<(SimpleExpr, Order)>,
    soft_delete: Option<SoftDelete<E::Column>>,
    trashed: TrashedScope,
}

impl<E: EntityTrait> Default for QueryPlan<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> QueryPlan<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            proximity: None,
            orderings: Vec::new(),
            soft_delete: None,
            trashed: TrashedScope::default(),
        }
    }

    /// Plan for an entity whose rows are soft-deleted via `column`.
    #[must_use]
    pub fn with_soft_deletes(mut self, soft_delete: SoftDelete<E::Column>) -> Self {
        self.soft_delete = Some(soft_delete);
        self
    }

    /// Conjoin a constraint (a single expression or a whole group).
    pub fn and_where<C: Into<ConditionExpression>>(&mut self, constraint: C) -> &mut Self {
        let condition = std::mem::replace(&mut self.condition, Condition::all());
        self.condition = condition.add(constraint);
        self
    }

    /// Conjoin a constraint if a predicate builder produced one.
    pub fn and_where_option<C: Into<ConditionExpression>>(&mut self, constraint: Option<C>) -> &mut Self {
        match constraint {
            Some(constraint) => self.and_where(constraint),
            None => self,
        }
    }

    /// Restrict to rows within a radius, nearest first. A later call
    /// replaces an earlier one.
    pub fn set_proximity(&mut self, proximity: Proximity<E::Column>) -> &mut Self {
        self.proximity = Some(proximity);
        self
    }

    #[must_use]
    pub fn proximity(&self) -> Option<Proximity<E::Column>> {
        self.proximity
    }

    /// Append an ordering. Earlier orderings take precedence.
    pub fn order_by(&mut self, expr: SimpleExpr, direction: Order) -> &mut Self {
        self.orderings.push((expr, direction));
        self
    }

    pub fn order_by_column(&mut self, column: E::Column, direction: Order) -> &mut Self {
        self.order_by(column_expr(column).into(), direction)
    }

    #[must_use]
    pub fn soft_delete(&self) -> Option<&SoftDelete<E::Column>> {
        self.soft_delete.as_ref()
    }

    pub fn set_trashed(&mut self, scope: TrashedScope) -> &mut Self {
        self.trashed = scope;
        self
    }

    #[must_use]
    pub fn trashed(&self) -> TrashedScope {
        self.trashed
    }

    /// Number of orderings added so far.
    #[must_use]
    pub fn ordering_count(&self) -> usize {
        self.orderings.len()
    }

    /// The composed filter condition, soft-delete visibility included.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = self.condition.clone();
        if let Some(soft_delete) = &self.soft_delete {
            match self.trashed {
                TrashedScope::Exclude => condition = condition.add(soft_delete.column.is_null()),
                TrashedScope::Only => condition = condition.add(soft_delete.column.is_not_null()),
                TrashedScope::With => {}
            }
        }
        condition
    }

    /// Render the plan as a Sea-ORM select for `backend`.
    ///
    /// A proximity search becomes a `distance` output column, a radius
    /// constraint and the leading ordering. On SQLite it only contributes
    /// its bounding box; see [`Proximity::nearest_first`].
    #[must_use]
    pub fn select(&self, backend: DbBackend) -> Select<E> {
        let mut select = E::find();
        let mut condition = self.condition();
        if let Some(proximity) = &self.proximity {
            if backend == DbBackend::Sqlite {
                condition = condition.add(bounding_box_condition(proximity.columns, proximity.bounding_box()));
            } else {
                let distance = proximity.distance_expr();
                condition = condition.add(Expr::expr(distance.clone()).lte(proximity.radius_km));
                select = select
                    .column_as(distance.clone(), DISTANCE_ALIAS)
                    .order_by(distance, Order::Asc);
            }
        }
        select = select.filter(condition);
        for (expr, direction) in &self.orderings {
            select = select.order_by(expr.clone(), direction.clone());
        }
        select
    }

    /// SQL text with values inlined, for logging and assertions.
    #[must_use]
    pub fn to_sql(&self, backend: DbBackend) -> String {
        self.select(backend).build(backend).to_string()
    }
}
