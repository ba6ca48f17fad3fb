//! Caller authorization context.
//!
//! Authentication is performed by an outer layer which resolves the caller
//! into an [`AuthContext`] and installs it as an axum `Extension`. Predicates
//! receive the context explicitly; nothing in this crate reads ambient state.

use std::collections::HashSet;

/// Capability names checked by the permission-gated predicates.
pub mod capability {
    pub const DELETE_TRAILS: &str = "delete trails";
    pub const VIEW_ALL_TRAILS: &str = "view all trails";
    pub const VIEW_ALL_GROUP_HIKES: &str = "view all group hikes";
    pub const DELETE_MEDIA: &str = "delete media";
    pub const VIEW_ALL_MEDIA: &str = "view all media";
    pub const DELETE_USERS: &str = "delete users";
    pub const VIEW_ALL_USERS: &str = "view all users";
}

/// The acting principal: an optional user id plus the capabilities it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user_id: Option<i32>,
    capabilities: HashSet<String>,
}

impl AuthContext {
    /// An unauthenticated caller holding no capabilities.
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            capabilities: HashSet::new(),
        }
    }

    /// Grant a capability, returning the extended context.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.user_id
    }

    #[must_use]
    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}
