//! Category entity - groups primitives (materials, work, stock) for the spreadsheet exports.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name used as a section heading in the materials sheet
    pub name: String,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many primitives
    #[sea_orm(has_many = "super::constructor_object::Entity")]
    ConstructorObjects,
}

impl Related<super::constructor_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConstructorObjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
