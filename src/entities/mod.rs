//! Sea-ORM entities for every listed collection plus the lookup and pivot
//! tables the relation filters traverse.

pub mod activity_log;
pub mod amenity;
pub mod company;
pub mod group_hike;
pub mod media;
pub mod region;
pub mod trail;
pub mod trail_amenity;
pub mod user;
pub mod user_role;
