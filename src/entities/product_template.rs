//! Product template entity - a component slot of a product.
//!
//! The default primitive and quantity describe a standard product's fixed
//! composition. For custom products they seed the slot values of each set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_templates")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product this slot belongs to
    pub product_id: i64,
    /// Slot name (e.g., "Утеплитель")
    pub name: String,
    /// Primitive used when nothing else is chosen
    pub constructor_object_id: i64,
    /// Quantity of the primitive per unit of the product
    pub quantity: f64,
}

/// Defines relationships between `ProductTemplate` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Default primitive of the slot
    #[sea_orm(
        belongs_to = "super::constructor_object::Entity",
        from = "Column::ConstructorObjectId",
        to = "super::constructor_object::Column::Id"
    )]
    ConstructorObject,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::constructor_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConstructorObject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
