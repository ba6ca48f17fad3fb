use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit trail entry: who (`causer`) did what (`event`) to which record
/// (`subject`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub log_name: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub event: Option<String>,
    pub subject_type: Option<String>,
    pub subject_id: Option<i32>,
    pub causer_type: Option<String>,
    pub causer_id: Option<i32>,
    pub batch_uuid: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
