//! Budget entity - the root of an estimate.
//!
//! A budget is either an `estimate` prepared for a client or a reusable
//! `solution`. It carries the raw pricing inputs for the three construction
//! stages and the derived values computed by [`crate::core::pricing`].
//! Three-element stage arrays are stored as JSON columns.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `kind` value for client estimates
pub const KIND_ESTIMATE: &str = "estimate";
/// `kind` value for reusable solutions
pub const KIND_SOLUTION: &str = "solution";

/// One value per construction stage, index 0 is the first stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StageValues(pub [f64; 3]);

impl StageValues {
    /// All three stages set to zero
    pub const ZERO: Self = Self([0.0; 3]);

    /// Sum over all three stages
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl From<[f64; 3]> for StageValues {
    fn from(values: [f64; 3]) -> Self {
        Self(values)
    }
}

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `"estimate"` or `"solution"`
    pub kind: String,
    /// Project name shown as the report title
    pub name: String,
    /// Client name, present for estimates only
    pub client: Option<String>,
    /// Construction area in m²
    pub area: f64,
    /// Overall price of the project
    pub price: f64,
    /// Overall price per m²
    pub price_by_area: f64,
    /// Ceiling height of the first floor in metres
    pub first_floor_height: f64,
    /// Lowest ceiling height of the second floor
    pub second_floor_height_min: Option<f64>,
    /// Highest ceiling height of the second floor
    pub second_floor_height_max: Option<f64>,
    /// Lowest ceiling height of the third floor
    pub third_floor_height_min: Option<f64>,
    /// Highest ceiling height of the third floor
    pub third_floor_height_max: Option<f64>,
    /// Derived floor code (1, 1.5, 2, 2.5 or 3)
    pub floors: f64,
    /// Label printed in front of discount lines
    pub discount_title: String,
    /// Discount percentage per stage
    #[sea_orm(column_type = "Json")]
    pub discount_by_stages: StageValues,
    /// Raw price per stage
    #[sea_orm(column_type = "Json")]
    pub price_by_stage: StageValues,
    /// Discount in money per stage
    #[sea_orm(column_type = "Json")]
    pub discount_amount: StageValues,
    /// Running total of stage prices
    #[sea_orm(column_type = "Json")]
    pub price_by_stage_aggregated: StageValues,
    /// Running total minus running discount
    #[sea_orm(column_type = "Json")]
    pub price_by_stage_aggregated_discounted: StageValues,
    /// Running total per m²
    #[sea_orm(column_type = "Json")]
    pub price_by_area_per_stage: StageValues,
    /// Discounted running total per m²
    #[sea_orm(column_type = "Json")]
    pub price_by_area_per_stage_discounted: StageValues,
    /// Whether the contract has been signed
    pub signed: bool,
    /// When the contract was signed
    pub signing_date: Option<Date>,
    /// When the budget was created
    pub created_at: DateTime,
}

impl Model {
    /// Whether this budget is a reusable solution rather than a client estimate
    #[must_use]
    pub fn is_solution(&self) -> bool {
        self.kind == KIND_SOLUTION
    }
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One budget has three stages
    #[sea_orm(has_many = "super::stage::Entity")]
    Stages,
    /// One budget has many materialized report primitives
    #[sea_orm(has_many = "super::report_primitive::Entity")]
    ReportPrimitives,
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stages.def()
    }
}

impl Related<super::report_primitive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportPrimitives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
