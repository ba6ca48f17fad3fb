//! Predicates and parameter scoping that depend on the caller's capabilities.

use sea_orm::{
    ColumnTrait, EntityTrait,
    sea_query::{Expr, SimpleExpr},
};

use super::plan::{QueryPlan, TrashedScope};
use super::spec::FilterScope;
use crate::auth::AuthContext;
use crate::models::ParameterMap;

/// `trashed=with|only`, honored only when the caller holds the entity's
/// delete capability. Otherwise default visibility (non-deleted) stays.
pub fn trashed<E: EntityTrait>(plan: &mut QueryPlan<E>, value: &str, scope: &FilterScope<'_>) {
    let Some(capability) = plan.soft_delete().map(|soft_delete| soft_delete.capability) else {
        return;
    };
    if !scope.auth().can(capability) {
        tracing::debug!(capability, "Caller may not widen soft-delete visibility");
        return;
    }
    match TrashedScope::parse(value) {
        Some(trashed) => {
            plan.set_trashed(trashed);
        }
        None => tracing::debug!(value, "Ignoring unknown trashed value"),
    }
}

/// Owner scoping for an entity: which parameter selects an owner, which
/// column holds it, and which capability lifts the restriction.
#[derive(Debug, Clone, Copy)]
pub struct OwnerScope<C> {
    pub parameter: &'static str,
    pub column: C,
    pub view_all: &'static str,
}

impl<C: ColumnTrait> OwnerScope<C> {
    fn restricted(&self, auth: &AuthContext) -> bool {
        !auth.can(self.view_all)
    }

    /// Remove the owner parameter before the dispatcher sees it when the
    /// caller cannot view other owners' records. Returns whether anything
    /// was stripped.
    pub fn strip_parameter(&self, params: &mut ParameterMap, auth: &AuthContext) -> bool {
        if !self.restricted(auth) {
            return false;
        }
        let stripped = params.shift_remove(self.parameter).is_some();
        if stripped {
            tracing::debug!(parameter = self.parameter, "Stripped owner parameter for restricted caller");
        }
        stripped
    }

    /// Unconditional `owner = caller` for restricted callers. A restricted
    /// caller without an identity matches nothing.
    #[must_use]
    pub fn constraint(&self, auth: &AuthContext) -> Option<SimpleExpr> {
        if !self.restricted(auth) {
            return None;
        }
        Some(match auth.user_id() {
            Some(user_id) => self.column.eq(user_id),
            None => Expr::val(1).eq(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::capability;
    use crate::entities::trail;
    use crate::filtering::plan::SoftDelete;
    use crate::models::parameter_map;

    const OWNER: OwnerScope<trail::Column> = OwnerScope {
        parameter: "created_by",
        column: trail::Column::CreatedBy,
        view_all: capability::VIEW_ALL_TRAILS,
    };

    fn plan() -> QueryPlan<trail::Entity> {
        QueryPlan::new().with_soft_deletes(SoftDelete {
            column: trail::Column::DeletedAt,
            capability: capability::DELETE_TRAILS,
        })
    }

    #[test]
    fn test_trashed_requires_delete_capability() {
        let params = parameter_map([("trashed", "only")]);
        let auth = AuthContext::user(1);
        let mut plan = plan();
        trashed(&mut plan, "only", &FilterScope::new(&params, &auth));
        assert_eq!(plan.trashed(), TrashedScope::Exclude);

        let auth = AuthContext::user(1).with_capability(capability::DELETE_TRAILS);
        trashed(&mut plan, "only", &FilterScope::new(&params, &auth));
        assert_eq!(plan.trashed(), TrashedScope::Only);
    }

    #[test]
    fn test_trashed_ignores_unknown_values() {
        let params = parameter_map([("trashed", "everything")]);
        let auth = AuthContext::user(1).with_capability(capability::DELETE_TRAILS);
        let mut plan = plan();
        trashed(&mut plan, "everything", &FilterScope::new(&params, &auth));
        assert_eq!(plan.trashed(), TrashedScope::Exclude);
    }

    #[test]
    fn test_owner_parameter_stripped_for_restricted_callers() {
        let mut params = parameter_map([("created_by", "9"), ("status", "draft")]);
        assert!(OWNER.strip_parameter(&mut params, &AuthContext::user(3)));
        assert!(!params.contains_key("created_by"));
        assert_eq!(params.get_index(0).map(|(k, _)| k.as_str()), Some("status"));

        let mut params = parameter_map([("created_by", "9")]);
        let admin = AuthContext::user(3).with_capability(capability::VIEW_ALL_TRAILS);
        assert!(!OWNER.strip_parameter(&mut params, &admin));
        assert!(params.contains_key("created_by"));
    }

    #[test]
    fn test_owner_constraint() {
        let admin = AuthContext::user(3).with_capability(capability::VIEW_ALL_TRAILS);
        assert!(OWNER.constraint(&admin).is_none());

        let expr = OWNER.constraint(&AuthContext::user(3)).unwrap();
        assert_eq!(format!("{expr:?}"), format!("{:?}", trail::Column::CreatedBy.eq(3)));

        let nobody = OWNER.constraint(&AuthContext::guest()).unwrap();
        assert_eq!(format!("{nobody:?}"), format!("{:?}", Expr::val(1).eq(0)));
    }
}
