use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A hiking trail. Duration is stored as a `(duration_type, duration_min,
/// duration_max)` triple where `duration_type` is `hours` or `days`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: String,
    pub difficulty: String,
    pub region_id: Option<i32>,
    pub created_by: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub distance_km: Option<f64>,
    pub duration_type: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub duration_min: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub duration_max: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub latitude: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub longitude: Option<f64>,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
