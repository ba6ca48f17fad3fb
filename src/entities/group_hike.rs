use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A scheduled, organized hike on a trail.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_hikes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: String,
    pub organizer_id: i32,
    pub company_id: Option<i32>,
    pub trail_id: Option<i32>,
    pub region_id: Option<i32>,
    pub start_date: Date,
    #[sea_orm(column_type = "Double", nullable)]
    pub price: Option<f64>,
    pub is_featured: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
