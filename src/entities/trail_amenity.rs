//! Pivot between trails and amenities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trail_amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub trail_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub amenity_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
