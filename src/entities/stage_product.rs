//! Stage product entity - a catalog product placed into a stage with a quantity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stage product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage_products")]
pub struct Model {
    /// Unique identifier for the stage product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning stage
    pub stage_id: i64,
    /// Referenced catalog product
    pub product_id: i64,
    /// Ordered quantity in the product's unit
    pub quantity: f64,
    /// Whether installation is included
    pub with_work: bool,
    /// Unit price captured when the product was added
    pub price: f64,
}

/// Defines relationships between `StageProduct` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stage product belongs to one stage
    #[sea_orm(
        belongs_to = "super::stage::Entity",
        from = "Column::StageId",
        to = "super::stage::Column::Id"
    )]
    Stage,
    /// Each stage product references one catalog product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Custom products own one selection row per product set
    #[sea_orm(has_many = "super::stage_product_set::Entity")]
    StageProductSets,
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::stage_product_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageProductSets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
