//! Product entity - a sellable catalog item placed into budget stages.
//!
//! Standard products have a fixed composition given by their templates.
//! Custom products offer several product sets; the estimator picks one per
//! stage product and fills the template slots with primitives.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Фундамент УШП")
    pub name: String,
    /// Long description printed under the product name in the report
    pub description: String,
    /// Short hint shown while editing
    pub hint: String,
    /// Measurement unit
    pub unit_id: i64,
    /// Price per unit including installation
    pub price: f64,
    /// Price per unit without installation
    pub price_without_work: f64,
    /// Margin, informational only
    pub profit: f64,
    /// Whether the product is assembled from a chosen product set
    pub custom: bool,
    /// Whether components and quantities are printed in the report
    pub display_components: bool,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product is measured in one unit
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
    /// Custom products offer many product sets
    #[sea_orm(has_many = "super::product_set::Entity")]
    ProductSets,
    /// Component slots of the product
    #[sea_orm(has_many = "super::product_template::Entity")]
    ProductTemplates,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::product_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductSets.def()
    }
}

impl Related<super::product_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTemplates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
