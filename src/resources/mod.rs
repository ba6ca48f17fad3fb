//! Filter specifications of every listed entity.
//!
//! Each specification is built once on first use and shared read-only by all
//! requests.

pub mod activity_logs;
pub mod group_hikes;
pub mod media;
pub mod trails;
pub mod users;

pub use activity_logs::ACTIVITY_LOG_FILTERS;
pub use group_hikes::{GROUP_HIKE_FILTERS, PUBLIC_GROUP_HIKE_FILTERS};
pub use media::MEDIA_FILTERS;
pub use trails::{PUBLIC_TRAIL_FILTERS, TRAIL_FILTERS};
pub use users::USER_FILTERS;
