//! Stage product set value entity - the primitive chosen for one template slot
//! of a product set, with its quantity per unit of the stage product.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Set value database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage_product_set_values")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning stage product set
    pub stage_product_set_id: i64,
    /// Template slot being filled
    pub product_template_id: i64,
    /// Primitive chosen for the slot
    pub constructor_object_id: i64,
    /// Quantity of the primitive per unit of the stage product
    pub quantity: f64,
}

/// Defines relationships between `StageProductSetValue` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each value belongs to one stage product set
    #[sea_orm(
        belongs_to = "super::stage_product_set::Entity",
        from = "Column::StageProductSetId",
        to = "super::stage_product_set::Column::Id"
    )]
    StageProductSet,
    /// Each value fills one template slot
    #[sea_orm(
        belongs_to = "super::product_template::Entity",
        from = "Column::ProductTemplateId",
        to = "super::product_template::Column::Id"
    )]
    ProductTemplate,
    /// Each value references one primitive
    #[sea_orm(
        belongs_to = "super::constructor_object::Entity",
        from = "Column::ConstructorObjectId",
        to = "super::constructor_object::Column::Id"
    )]
    ConstructorObject,
}

impl Related<super::stage_product_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageProductSet.def()
    }
}

impl Related<super::product_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTemplate.def()
    }
}

impl Related<super::constructor_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConstructorObject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
