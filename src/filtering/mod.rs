//! # Filtering, Sorting & Pagination
//!
//! Translates an open-ended map of query-string parameters into a composed
//! [`QueryPlan`] for one entity, driven by that entity's [`FilterSpec`].
//!
//! ## Main Components
//!
//! - **[`FilterSpec`]**: the explicit table of recognized filters, sortable
//!   columns, default ordering and page size
//! - **[`QueryPlan`]**: request-owned accumulator of constraints, derived
//!   columns, orderings and soft-delete visibility
//! - **Predicate builders**: [`conditions`], [`search`], [`relations`],
//!   [`duration`], [`geo`], [`permissions`]
//! - **Resolvers**: [`sort`] and [`pagination`]
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Multi-value equality (IN query), unknown values dropped
//! GET /admin/trails?status=published,archived
//!
//! // Trails having every listed amenity / at least one of them
//! GET /trails?amenities=1,4
//! GET /trails?amenities_any=1,4
//!
//! // Duration in hours, matching hour- and day-based trails
//! GET /trails?min_duration=4&max_duration=16
//!
//! // Proximity, nearest first
//! GET /trails?near_lat=46.5&near_lng=7.9&radius=30
//!
//! // Sorting and paging
//! GET /admin/media?sort=size&order=desc&per_page=50&page=2
//! ```
//!
//! Malformed filter values never fail a request: the predicate is skipped and
//! the rest of the plan proceeds. Unknown parameters are ignored.

pub mod conditions;
pub mod duration;
pub mod geo;
pub mod pagination;
pub mod permissions;
pub mod plan;
pub mod relations;
pub mod search;
pub mod sort;
pub mod spec;

pub use pagination::PageRequest;
pub use plan::{QueryPlan, SoftDelete, TrashedScope};
pub use spec::{FilterHandler, FilterScope, FilterSpec, FilterSpecBuilder, PredicateFn};
