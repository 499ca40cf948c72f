//! Stage entity - one of the three construction stages of a budget.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stage database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stages")]
pub struct Model {
    /// Unique identifier for the stage
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning budget
    pub budget_id: i64,
    /// Stage ordinal, 1 to 3
    pub number: i32,
    /// Sum of the stage products' line prices
    pub price: f64,
    /// Stage price after the stage discount
    pub price_with_discount: f64,
    /// Inactive stages are not counted when deciding whether a budget has several stages
    pub active: bool,
}

/// Defines relationships between Stage and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stage belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// One stage has many stage products
    #[sea_orm(has_many = "super::stage_product::Entity")]
    StageProducts,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::stage_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
