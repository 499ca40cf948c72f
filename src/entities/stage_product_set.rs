//! Stage product set entity - a product set offered for a custom stage product,
//! with the flag marking the one the client chose.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stage product set database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage_product_sets")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning stage product
    pub stage_product_id: i64,
    /// Catalog product set this row instantiates
    pub product_set_id: i64,
    /// Whether this set is the chosen one
    pub selected: bool,
}

/// Defines relationships between `StageProductSet` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one stage product
    #[sea_orm(
        belongs_to = "super::stage_product::Entity",
        from = "Column::StageProductId",
        to = "super::stage_product::Column::Id"
    )]
    StageProduct,
    /// Each row instantiates one catalog product set
    #[sea_orm(
        belongs_to = "super::product_set::Entity",
        from = "Column::ProductSetId",
        to = "super::product_set::Column::Id"
    )]
    ProductSet,
    /// Values picked for each template slot
    #[sea_orm(has_many = "super::stage_product_set_value::Entity")]
    Values,
}

impl Related<super::stage_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageProduct.def()
    }
}

impl Related<super::product_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductSet.def()
    }
}

impl Related<super::stage_product_set_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Values.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
