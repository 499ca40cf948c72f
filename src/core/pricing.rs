//! Stage pricing aggregation.
//!
//! The three stages are priced cumulatively: every stage total includes all
//! earlier stages, and the discount subtracted from a running total is the
//! running sum of stage discounts, not the discount of that stage alone.
//! Money is rounded half away from zero to two decimals.

use crate::{
    core::floors::classify,
    entities::{Budget, StageValues, budget},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Rounds a money value to two decimals, halves away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Discount in money for one stage price and percentage
#[must_use]
pub fn stage_discount(price: f64, discount_pct: f64) -> f64 {
    round2(price * discount_pct / 100.0)
}

/// Price per m², `None` when the area is not positive
#[must_use]
pub fn price_per_area(price: f64, area: f64) -> Option<f64> {
    (area > 0.0).then(|| round2(price / area))
}

/// Output of [`aggregate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationResult {
    /// Discount in money per stage
    pub discount_amount: StageValues,
    /// Running total of stage prices
    pub price_by_stage_aggregated: StageValues,
    /// Running total minus running discount
    pub price_by_stage_aggregated_discounted: StageValues,
    /// Running total per m², `None` when the area is not positive
    pub price_by_area_per_stage: Option<StageValues>,
    /// Discounted running total per m², `None` when the area is not positive
    pub price_by_area_per_stage_discounted: Option<StageValues>,
}

/// Aggregates per-stage prices and discount percentages.
///
/// Stage `i` depends on stage `i - 1`, so the loop runs strictly left to right.
#[must_use]
pub fn aggregate(
    price_by_stage: StageValues,
    discount_pct: StageValues,
    area: f64,
) -> AggregationResult {
    let prices = price_by_stage.0;
    let mut discount_amount = [0.0; 3];
    let mut aggregated = [0.0; 3];
    let mut aggregated_discounted = [0.0; 3];
    let mut discount_all = 0.0;

    for i in 0..3 {
        aggregated[i] = if i == 0 {
            prices[0]
        } else {
            aggregated[i - 1] + prices[i]
        };
        discount_amount[i] = stage_discount(prices[i], discount_pct.0[i]);
        discount_all += discount_amount[i];
        aggregated_discounted[i] = aggregated[i] - discount_all;
    }

    let per_area = |values: [f64; 3]| {
        (area > 0.0).then(|| StageValues(values.map(|v| round2(v / area))))
    };

    AggregationResult {
        discount_amount: StageValues(discount_amount),
        price_by_stage_aggregated: StageValues(aggregated),
        price_by_stage_aggregated_discounted: StageValues(aggregated_discounted),
        price_by_area_per_stage: per_area(aggregated),
        price_by_area_per_stage_discounted: per_area(aggregated_discounted),
    }
}

/// Recomputes every derived pricing field of a budget and saves it.
///
/// Absent second and third floor heights are stored as zero and the floor code
/// is derived from them. When the area is not positive the per-area fields keep
/// their previous values.
#[instrument(skip(db))]
pub async fn recalculate_budget(db: &DatabaseConnection, budget_id: i64) -> Result<budget::Model> {
    let budget = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let result = aggregate(budget.price_by_stage, budget.discount_by_stages, budget.area);
    debug!(?result, "Aggregated stage pricing");

    let second_min = budget.second_floor_height_min.unwrap_or(0.0);
    let third_min = budget.third_floor_height_min.unwrap_or(0.0);
    let floors = classify(second_min, third_min);
    let overall_per_area = price_per_area(budget.price, budget.area);
    let second_max = budget.second_floor_height_max.unwrap_or(0.0);
    let third_max = budget.third_floor_height_max.unwrap_or(0.0);

    let mut active: budget::ActiveModel = budget.into();
    active.discount_amount = Set(result.discount_amount);
    active.price_by_stage_aggregated = Set(result.price_by_stage_aggregated);
    active.price_by_stage_aggregated_discounted = Set(result.price_by_stage_aggregated_discounted);

    match (
        overall_per_area,
        result.price_by_area_per_stage,
        result.price_by_area_per_stage_discounted,
    ) {
        (Some(overall), Some(per_stage), Some(per_stage_discounted)) => {
            active.price_by_area = Set(overall);
            active.price_by_area_per_stage = Set(per_stage);
            active.price_by_area_per_stage_discounted = Set(per_stage_discounted);
        }
        _ => warn!(budget_id, "Area is not positive, per-area prices left unchanged"),
    }

    active.second_floor_height_min = Set(Some(second_min));
    active.second_floor_height_max = Set(Some(second_max));
    active.third_floor_height_min = Set(Some(third_min));
    active.third_floor_height_max = Set(Some(third_max));
    active.floors = Set(floors.value());

    let saved = active.update(db).await?;
    info!(budget_id, floors = %floors, "Budget pricing recalculated");
    Ok(saved)
}
