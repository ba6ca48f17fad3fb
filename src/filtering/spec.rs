//! Per-entity filter specifications and the dispatcher that applies them.

use indexmap::IndexMap;
use sea_orm::{EntityTrait, IdenStatic, Order};

use super::pagination::{DEFAULT_PER_PAGE, PageRequest};
use super::permissions::OwnerScope;
use super::plan::{QueryPlan, SoftDelete};
use super::sort::resolve_sort;
use crate::auth::AuthContext;
use crate::models::ParameterMap;

/// Parameters consumed by the sort and pagination resolvers rather than by
/// filter handlers.
pub const RESERVED_PARAMETERS: [&str; 4] = ["sort", "order", "per_page", "page"];

/// Read-only view handed to every predicate: the whole parameter map (for
/// predicates spanning several parameters) and the caller's authorization.
#[derive(Debug, Clone, Copy)]
pub struct FilterScope<'a> {
    params: &'a ParameterMap,
    auth: &'a AuthContext,
}

impl<'a> FilterScope<'a> {
    #[must_use]
    pub fn new(params: &'a ParameterMap, auth: &'a AuthContext) -> Self {
        Self { params, auth }
    }

    /// A sibling parameter, trimmed. Blank values count as absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn auth(&self) -> &'a AuthContext {
        self.auth
    }
}

/// A predicate builder: adds zero or more constraints for one non-empty
/// parameter value. Never fails; malformed values add nothing.
pub type PredicateFn<E> = fn(&mut QueryPlan<E>, &str, &FilterScope<'_>);

/// Entry of a specification's dispatch table.
pub enum FilterHandler<E: EntityTrait> {
    Apply(PredicateFn<E>),
    /// Recognized but deliberately inert (not externally controllable).
    Disabled,
}

impl<E: EntityTrait> Clone for FilterHandler<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: EntityTrait> Copy for FilterHandler<E> {}

impl<E: EntityTrait> std::fmt::Debug for FilterHandler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply(_) => f.write_str("Apply"),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Filter specification of one entity listing: recognized filters, sortable
/// columns, default ordering and page size, soft-delete and owner scoping.
///
/// Built once at startup and shared read-only by all requests.
#[derive(Debug)]
pub struct FilterSpec<E: EntityTrait> {
    name: &'static str,
    handlers: IndexMap<&'static str, FilterHandler<E>>,
    sortable: Vec<(&'static str, E::Column)>,
    default_sort: (E::Column, Order),
    tie_breaker: E::Column,
    default_per_page: u64,
    soft_delete: Option<SoftDelete<E::Column>>,
    owner: Option<OwnerScope<E::Column>>,
    ranges: Vec<(&'static str, &'static str)>,
}

impl<E: EntityTrait> FilterSpec<E> {
    /// Start a specification. `primary_key` orders ties last so pages are
    /// stable; it is also the default sort column until overridden.
    #[must_use]
    pub fn builder(name: &'static str, primary_key: E::Column) -> FilterSpecBuilder<E> {
        FilterSpecBuilder {
            spec: Self {
                name,
                handlers: IndexMap::new(),
                sortable: Vec::new(),
                default_sort: (primary_key, Order::Asc),
                tie_breaker: primary_key,
                default_per_page: DEFAULT_PER_PAGE,
                soft_delete: None,
                owner: None,
                ranges: Vec::new(),
            },
        }
    }

    /// Start a new specification from a copy of this one, to be specialized
    /// (typically disabling entries for a public variant).
    #[must_use]
    pub fn derive(&self, name: &'static str) -> FilterSpecBuilder<E> {
        FilterSpecBuilder {
            spec: Self {
                name,
                handlers: self.handlers.clone(),
                sortable: self.sortable.clone(),
                default_sort: (self.default_sort.0, self.default_sort.1.clone()),
                tie_breaker: self.tie_breaker,
                default_per_page: self.default_per_page,
                soft_delete: self.soft_delete,
                owner: self.owner,
                ranges: self.ranges.clone(),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn handler(&self, filter: &str) -> Option<FilterHandler<E>> {
        self.handlers.get(filter).copied()
    }

    /// Names of all filters this specification recognizes.
    pub fn filter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    #[must_use]
    pub fn sortable_columns(&self) -> &[(&'static str, E::Column)] {
        &self.sortable
    }

    #[must_use]
    pub fn default_per_page(&self) -> u64 {
        self.default_per_page
    }

    #[must_use]
    pub fn owner(&self) -> Option<&OwnerScope<E::Column>> {
        self.owner.as_ref()
    }

    /// `(min, max)` parameter pairs whose cross-field consistency is checked
    /// by request validation.
    #[must_use]
    pub fn ranges(&self) -> &[(&'static str, &'static str)] {
        &self.ranges
    }

    /// An empty plan carrying this entity's soft-delete configuration.
    #[must_use]
    pub fn new_plan(&self) -> QueryPlan<E> {
        let plan = QueryPlan::new();
        match self.soft_delete {
            Some(soft_delete) => plan.with_soft_deletes(soft_delete),
            None => plan,
        }
    }

    /// Dispatch every non-empty parameter to its handler. Unknown and
    /// disabled parameters are ignored.
    pub fn apply<'p>(
        &self,
        params: &ParameterMap,
        plan: &'p mut QueryPlan<E>,
        auth: &AuthContext,
    ) -> &'p mut QueryPlan<E> {
        let scope = FilterScope::new(params, auth);
        for (name, raw) in params {
            let value = raw.trim();
            if value.is_empty() || RESERVED_PARAMETERS.contains(&name.as_str()) {
                continue;
            }
            match self.handlers.get(name.as_str()) {
                Some(FilterHandler::Apply(handler)) => handler(plan, value, &scope),
                Some(FilterHandler::Disabled) => {
                    tracing::trace!(spec = self.name, filter = %name, "Filter disabled, ignoring");
                }
                None => tracing::trace!(spec = self.name, filter = %name, "Unknown filter, ignoring"),
            }
        }
        plan
    }

    /// Append the resolved `sort`/`order` ordering plus the primary key
    /// tie-breaker.
    pub fn apply_sort<'p>(&self, params: &ParameterMap, plan: &'p mut QueryPlan<E>) -> &'p mut QueryPlan<E> {
        let (column, direction) = resolve_sort(
            params.get("sort").map(String::as_str),
            params.get("order").map(String::as_str),
            &self.sortable,
            (self.default_sort.0, self.default_sort.1.clone()),
        );
        plan.order_by_column(column, direction);
        if column.as_str() != self.tie_breaker.as_str() {
            plan.order_by_column(self.tie_breaker, Order::Asc);
        }
        plan
    }

    /// Filters then ordering, as one fresh plan.
    #[must_use]
    pub fn plan(&self, params: &ParameterMap, auth: &AuthContext) -> QueryPlan<E> {
        let mut plan = self.new_plan();
        self.apply(params, &mut plan, auth);
        self.apply_sort(params, &mut plan);
        plan
    }

    #[must_use]
    pub fn page_request(&self, params: &ParameterMap) -> PageRequest {
        PageRequest::resolve(
            params.get("page").map(String::as_str),
            params.get("per_page").map(String::as_str),
            self.default_per_page,
        )
    }
}

/// Builder for [`FilterSpec`].
#[derive(Debug)]
pub struct FilterSpecBuilder<E: EntityTrait> {
    spec: FilterSpec<E>,
}

impl<E: EntityTrait> FilterSpecBuilder<E> {
    /// Register (or replace) a filter.
    #[must_use]
    pub fn filter(mut self, name: &'static str, handler: PredicateFn<E>) -> Self {
        self.spec.handlers.insert(name, FilterHandler::Apply(handler));
        self
    }

    /// Replace filters with explicit no-ops.
    #[must_use]
    pub fn disable<const N: usize>(mut self, names: [&'static str; N]) -> Self {
        for name in names {
            self.spec.handlers.insert(name, FilterHandler::Disabled);
        }
        self
    }

    #[must_use]
    pub fn sortable<const N: usize>(mut self, columns: [(&'static str, E::Column); N]) -> Self {
        self.spec.sortable.extend(columns);
        self
    }

    #[must_use]
    pub fn default_sort(mut self, column: E::Column, direction: Order) -> Self {
        self.spec.default_sort = (column, direction);
        self
    }

    #[must_use]
    pub fn per_page(mut self, default_per_page: u64) -> Self {
        self.spec.default_per_page = default_per_page;
        self
    }

    #[must_use]
    pub fn soft_deletes(mut self, column: E::Column, capability: &'static str) -> Self {
        self.spec.soft_delete = Some(SoftDelete { column, capability });
        self
    }

    #[must_use]
    pub fn owner(mut self, parameter: &'static str, column: E::Column, view_all: &'static str) -> Self {
        self.spec.owner = Some(OwnerScope {
            parameter,
            column,
            view_all,
        });
        self
    }

    #[must_use]
    pub fn without_owner(mut self) -> Self {
        self.spec.owner = None;
        self
    }

    #[must_use]
    pub fn range(mut self, min: &'static str, max: &'static str) -> Self {
        self.spec.ranges.push((min, max));
        self
    }

    #[must_use]
    pub fn build(self) -> FilterSpec<E> {
        self.spec
    }
}
