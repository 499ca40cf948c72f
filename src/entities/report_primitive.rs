//! Report primitive entity - materialized primitive totals of a budget,
//! rebuilt whenever the budget is saved.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report primitive database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_primitives")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Budget the totals were computed for
    pub budget_id: i64,
    /// Primitive being counted
    pub constructor_object_id: i64,
    /// Total quantity across all stages
    pub quantity: f64,
}

/// Defines relationships between `ReportPrimitive` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// Each row counts one primitive
    #[sea_orm(
        belongs_to = "super::constructor_object::Entity",
        from = "Column::ConstructorObjectId",
        to = "super::constructor_object::Column::Id"
    )]
    ConstructorObject,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::constructor_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConstructorObject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
