//! Constructor object entity - a priced primitive (material or labour item)
//! from which products are assembled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Constructor object database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "constructor_objects")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the primitive
    pub name: String,
    /// Measurement unit
    pub unit_id: i64,
    /// Category used by the spreadsheet projections
    pub category_id: i64,
    /// Price per unit including installation
    pub price: f64,
    /// Price per unit of the material alone
    pub price_without_work: f64,
    /// Whether this primitive is a labour item
    pub work_primitive: bool,
}

/// Defines relationships between `ConstructorObject` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each primitive is measured in one unit
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
    /// Each primitive belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
