use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub expression: String,
    pub subhealth_condition_type: Option<String>,
    pub subhealth_threshold: Option<f64>,
    pub fault_condition_type: Option<String>,
    pub fault_threshold: Option<f64>,
    pub severity: String,
    pub duration: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
