//! Budget business logic - creation, pricing inputs, listing and removal.
//!
//! A budget is always created together with its three stages. Removing a
//! budget deletes its whole stage hierarchy and report primitives inside one
//! transaction, children first.

use crate::{
    core::floors::FloorCode,
    entities::{
        Budget, ReportPrimitive, Stage, StageProduct, StageValues, budget, report_primitive,
        stage, stage_product,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Smallest area covered by the statistics brackets
pub const AREA_MIN: f64 = 10.0;
/// Largest area covered by the statistics brackets
pub const AREA_MAX: f64 = 250.0;
/// Width of one statistics bracket
pub const AREA_STEP: f64 = 20.0;

/// Number of construction stages in every budget
pub const STAGE_COUNT: i32 = 3;

/// Whether a budget is prepared for a client or kept as a reusable solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    /// Client estimate; requires a client and a name unique for that client
    Estimate,
    /// Reusable solution template
    Solution,
}

impl BudgetKind {
    /// Value stored in `budgets.kind`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Estimate => budget::KIND_ESTIMATE,
            Self::Solution => budget::KIND_SOLUTION,
        }
    }
}

/// Input for [`create_budget`]
#[derive(Debug, Clone)]
pub struct NewBudget {
    /// Estimate or solution
    pub kind: BudgetKind,
    /// Project name
    pub name: String,
    /// Client name, required for estimates
    pub client: Option<String>,
    /// Construction area in m²
    pub area: f64,
    /// First floor ceiling height in metres
    pub first_floor_height: f64,
    /// Second floor lowest ceiling
    pub second_floor_height_min: Option<f64>,
    /// Second floor highest ceiling
    pub second_floor_height_max: Option<f64>,
    /// Third floor lowest ceiling
    pub third_floor_height_min: Option<f64>,
    /// Third floor highest ceiling
    pub third_floor_height_max: Option<f64>,
    /// Label printed in front of discount lines
    pub discount_title: String,
}

/// Pricing inputs set by the estimator
#[derive(Debug, Clone)]
pub struct PricingInput {
    /// Overall project price
    pub price: f64,
    /// Raw price per stage
    pub price_by_stage: StageValues,
    /// Discount percentage per stage
    pub discount_by_stages: StageValues,
    /// New discount label, unchanged when `None`
    pub discount_title: Option<String>,
}

fn has_precision(value: f64, places: i32) -> bool {
    let scaled = value * 10f64.powi(places);
    (scaled - scaled.round()).abs() < 1e-6
}

fn validate_height_range(
    min_field: &'static str,
    min: Option<f64>,
    max_field: &'static str,
    max: Option<f64>,
) -> Result<()> {
    for (field, value) in [(min_field, min), (max_field, max)] {
        if let Some(v) = value {
            if !v.is_finite() || !has_precision(v, 3) {
                return Err(Error::validation(field, "must have at most 3 decimals"));
            }
        }
    }
    let max = max.unwrap_or(0.0);
    if max < 0.0 {
        return Err(Error::validation(max_field, "must not be negative"));
    }
    if min.unwrap_or(0.0) > max {
        return Err(Error::validation(min_field, format!("must not exceed {max}")));
    }
    Ok(())
}

/// Checks a new budget before it is written.
///
/// # Errors
/// Returns [`Error::Validation`] naming the first offending field.
pub fn validate_new_budget(input: &NewBudget) -> Result<()> {
    let name_len = input.name.trim().chars().count();
    if !(2..=256).contains(&name_len) {
        return Err(Error::validation("name", "must be 2 to 256 characters long"));
    }

    if !input.area.is_finite() || input.area <= 0.0 {
        return Err(Error::validation("area", "must be greater than 0"));
    }
    if !has_precision(input.area, 2) {
        return Err(Error::validation("area", "must have at most 2 decimals"));
    }

    if !input.first_floor_height.is_finite() || input.first_floor_height <= 0.0 {
        return Err(Error::validation("first_floor_height", "must be greater than 0"));
    }
    if !has_precision(input.first_floor_height, 3) {
        return Err(Error::validation(
            "first_floor_height",
            "must have at most 3 decimals",
        ));
    }

    validate_height_range(
        "second_floor_height_min",
        input.second_floor_height_min,
        "second_floor_height_max",
        input.second_floor_height_max,
    )?;
    validate_height_range(
        "third_floor_height_min",
        input.third_floor_height_min,
        "third_floor_height_max",
        input.third_floor_height_max,
    )?;

    if input.kind == BudgetKind::Estimate
        && input.client.as_deref().is_none_or(|c| c.trim().is_empty())
    {
        return Err(Error::validation("client", "is required for estimates"));
    }

    Ok(())
}

fn validate_pricing(input: &PricingInput) -> Result<()> {
    for amount in std::iter::once(input.price).chain(input.price_by_stage.0) {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    for pct in input.discount_by_stages.0 {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(Error::validation(
                "discount_by_stages",
                format!("{pct} is not a percentage between 0 and 100"),
            ));
        }
    }
    Ok(())
}

async fn ensure_unique_estimate_name(
    db: &DatabaseConnection,
    client: &str,
    name: &str,
) -> Result<()> {
    let wanted = name.trim().to_lowercase();
    let taken = Budget::find()
        .filter(budget::Column::Kind.eq(budget::KIND_ESTIMATE))
        .filter(budget::Column::Client.eq(client))
        .all(db)
        .await?
        .iter()
        .any(|existing| existing.name.to_lowercase() == wanted);

    if taken {
        return Err(Error::validation("name", "must be unique for the client"));
    }
    Ok(())
}

/// Creates a budget together with its three empty stages.
///
/// Derived pricing fields start at zero; call
/// [`crate::core::pricing::recalculate_budget`] after setting prices.
///
/// # Errors
/// Returns a validation error for bad input or a duplicate estimate name, or a
/// database error if the insert fails.
pub async fn create_budget(db: &DatabaseConnection, input: NewBudget) -> Result<budget::Model> {
    validate_new_budget(&input)?;

    let client = input.client.map(|c| c.trim().to_string());
    if input.kind == BudgetKind::Estimate {
        if let Some(client) = client.as_deref() {
            ensure_unique_estimate_name(db, client, &input.name).await?;
        }
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now().naive_utc();

    let budget = budget::ActiveModel {
        kind: Set(input.kind.as_str().to_string()),
        name: Set(input.name.trim().to_string()),
        client: Set(client),
        area: Set(input.area),
        price: Set(0.0),
        price_by_area: Set(0.0),
        first_floor_height: Set(input.first_floor_height),
        second_floor_height_min: Set(input.second_floor_height_min),
        second_floor_height_max: Set(input.second_floor_height_max),
        third_floor_height_min: Set(input.third_floor_height_min),
        third_floor_height_max: Set(input.third_floor_height_max),
        floors: Set(FloorCode::One.value()),
        discount_title: Set(input.discount_title),
        discount_by_stages: Set(StageValues::ZERO),
        price_by_stage: Set(StageValues::ZERO),
        discount_amount: Set(StageValues::ZERO),
        price_by_stage_aggregated: Set(StageValues::ZERO),
        price_by_stage_aggregated_discounted: Set(StageValues::ZERO),
        price_by_area_per_stage: Set(StageValues::ZERO),
        price_by_area_per_stage_discounted: Set(StageValues::ZERO),
        signed: Set(false),
        signing_date: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for number in 1..=STAGE_COUNT {
        stage::ActiveModel {
            budget_id: Set(budget.id),
            number: Set(number),
            price: Set(0.0),
            price_with_discount: Set(0.0),
            active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(budget_id = budget.id, name = %budget.name, "Budget created");
    Ok(budget)
}

/// Finds a budget by its unique ID.
pub async fn get_budget_by_id(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Option<budget::Model>> {
    Budget::find_by_id(budget_id).one(db).await.map_err(Into::into)
}

/// Retrieves the stages of a budget ordered by their number.
pub async fn get_stages(db: &DatabaseConnection, budget_id: i64) -> Result<Vec<stage::Model>> {
    Stage::find()
        .filter(stage::Column::BudgetId.eq(budget_id))
        .order_by_asc(stage::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one stage of a budget by ordinal.
///
/// # Errors
/// Returns [`Error::StageNotFound`] if the budget has no such stage.
pub async fn get_stage<C>(db: &C, budget_id: i64, number: i32) -> Result<stage::Model>
where
    C: ConnectionTrait,
{
    Stage::find()
        .filter(stage::Column::BudgetId.eq(budget_id))
        .filter(stage::Column::Number.eq(number))
        .one(db)
        .await?
        .ok_or(Error::StageNotFound { budget_id, number })
}

/// Replaces the pricing inputs of a budget.
///
/// Derived fields are not touched; recalculation is a separate step.
///
/// # Errors
/// Returns an error for negative or non-finite prices, discounts outside
/// 0..=100, or a missing budget.
pub async fn update_pricing(
    db: &DatabaseConnection,
    budget_id: i64,
    input: PricingInput,
) -> Result<budget::Model> {
    validate_pricing(&input)?;

    let mut budget: budget::ActiveModel = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?
        .into();

    budget.price = Set(input.price);
    budget.price_by_stage = Set(input.price_by_stage);
    budget.discount_by_stages = Set(input.discount_by_stages);
    if let Some(title) = input.discount_title {
        budget.discount_title = Set(title);
    }

    budget.update(db).await.map_err(Into::into)
}

/// Marks a budget as signed on the given date.
pub async fn mark_signed(
    db: &DatabaseConnection,
    budget_id: i64,
    signing_date: NaiveDate,
) -> Result<budget::Model> {
    let mut budget: budget::ActiveModel = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?
        .into();

    budget.signed = Set(true);
    budget.signing_date = Set(Some(signing_date));
    budget.update(db).await.map_err(Into::into)
}

/// Deletes a budget with its stages, stage products, set selections and report
/// primitives in one transaction.
///
/// # Errors
/// Returns [`Error::BudgetNotFound`] if the budget does not exist.
pub async fn delete_budget(db: &DatabaseConnection, budget_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let budget = Budget::find_by_id(budget_id)
        .one(&txn)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let stage_ids: Vec<i64> = Stage::find()
        .filter(stage::Column::BudgetId.eq(budget_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let stage_product_ids: Vec<i64> = StageProduct::find()
        .filter(stage_product::Column::StageId.is_in(stage_ids.clone()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|sp| sp.id)
        .collect();

    crate::core::stage::delete_stage_product_rows(&txn, stage_product_ids).await?;

    Stage::delete_many()
        .filter(stage::Column::BudgetId.eq(budget_id))
        .exec(&txn)
        .await?;
    ReportPrimitive::delete_many()
        .filter(report_primitive::Column::BudgetId.eq(budget_id))
        .exec(&txn)
        .await?;
    budget.delete(&txn).await?;

    txn.commit().await?;
    info!(budget_id, "Budget deleted with its stages");
    Ok(())
}

/// Listing filter; every field is optional and they combine with AND
#[derive(Debug, Clone, Default)]
pub struct BudgetFilter {
    /// Only budgets with this floor code
    pub floor: Option<FloorCode>,
    /// Only signed budgets
    pub only_signed: bool,
    /// Signed no earlier than the day before this date
    pub signed_from: Option<NaiveDate>,
    /// Signed no later than the day after this date
    pub signed_to: Option<NaiveDate>,
    /// Area at least this large
    pub area_from: Option<f64>,
    /// Area strictly below this
    pub area_to: Option<f64>,
}

impl BudgetFilter {
    /// Restricts the area to one statistics bracket
    #[must_use]
    pub fn with_area_bracket(mut self, bracket: (f64, f64)) -> Self {
        self.area_from = Some(bracket.0);
        self.area_to = Some(bracket.1);
        self
    }
}

/// Lists budgets matching the filter, ordered by id.
pub async fn list_budgets(
    db: &DatabaseConnection,
    filter: &BudgetFilter,
) -> Result<Vec<budget::Model>> {
    let mut query = Budget::find();

    if let Some(floor) = filter.floor {
        query = query.filter(budget::Column::Floors.eq(floor.value()));
    }
    if filter.only_signed {
        query = query.filter(budget::Column::Signed.eq(true));
    }
    if let Some(from) = filter.signed_from {
        let from = from.pred_opt().unwrap_or(from);
        query = query.filter(budget::Column::SigningDate.gte(from));
    }
    if let Some(to) = filter.signed_to {
        let to = to.succ_opt().unwrap_or(to);
        query = query.filter(budget::Column::SigningDate.lte(to));
    }
    if let Some(from) = filter.area_from {
        query = query.filter(budget::Column::Area.gte(from));
    }
    if let Some(to) = filter.area_to {
        query = query.filter(budget::Column::Area.lt(to));
    }

    query
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Area brackets used for statistics: `[10, 30)`, `[30, 50)`, ... up to 250.
#[must_use]
pub fn area_brackets() -> Vec<(f64, f64)> {
    let mut brackets = Vec::new();
    let mut start = AREA_MIN;
    while start < AREA_MAX {
        let end = (start + AREA_STEP).min(AREA_MAX);
        brackets.push((start, end));
        start = end;
    }
    brackets
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{StageProductSet, StageProductSetValue};
    use crate::test_utils::*;

    #[test]
    fn test_validate_new_budget_accepts_defaults() {
        assert!(validate_new_budget(&test_budget_input("Дом")).is_ok());
    }

    #[test]
    fn test_validate_new_budget_name_length() {
        let mut input = test_budget_input("Д");
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation { field: "name", .. })
        ));

        input.name = "x".repeat(257);
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn test_validate_new_budget_area() {
        let mut input = test_budget_input("Дом");
        input.area = 0.0;
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation { field: "area", .. })
        ));

        input.area = 120.555;
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation { field: "area", .. })
        ));

        input.area = 120.55;
        assert!(validate_new_budget(&input).is_ok());
    }

    #[test]
    fn test_validate_new_budget_heights() {
        let mut input = test_budget_input("Дом");
        input.first_floor_height = 2.7501;
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation {
                field: "first_floor_height",
                ..
            })
        ));

        let mut input = test_budget_input("Дом");
        input.second_floor_height_min = Some(2.8);
        input.second_floor_height_max = Some(2.5);
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation {
                field: "second_floor_height_min",
                ..
            })
        ));

        let mut input = test_budget_input("Дом");
        input.third_floor_height_max = Some(-1.0);
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation {
                field: "third_floor_height_max",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_new_budget_estimate_needs_client() {
        let mut input = test_budget_input("Дом");
        input.client = Some("   ".to_string());
        assert!(matches!(
            validate_new_budget(&input),
            Err(Error::Validation { field: "client", .. })
        ));

        input.kind = BudgetKind::Solution;
        input.client = None;
        assert!(validate_new_budget(&input).is_ok());
    }

    #[tokio::test]
    async fn test_create_budget_seeds_three_stages() -> Result<()> {
        let db = setup_test_db().await?;
        let budget = create_test_budget(&db, "Дом у озера").await?;

        assert_eq!(budget.kind, "estimate");
        assert!(!budget.is_solution());
        assert_eq!(budget.area, 50.0);
        assert_eq!(budget.price_by_stage, StageValues::ZERO);

        let stages = get_stages(&db, budget.id).await?;
        let numbers: Vec<i32> = stages.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(stages.iter().all(|s| s.price == 0.0 && s.active));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_estimate_name_unique_per_client() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_budget(&db, "Дом у озера").await?;

        let duplicate = create_budget(&db, test_budget_input("дом У ОЗЕРА")).await;
        assert!(matches!(
            duplicate,
            Err(Error::Validation { field: "name", .. })
        ));

        let mut other_client = test_budget_input("Дом у озера");
        other_client.client = Some("Петров".to_string());
        assert!(create_budget(&db, other_client).await.is_ok());

        let mut solution = test_budget_input("Дом у озера");
        solution.kind = BudgetKind::Solution;
        solution.client = None;
        let solution = create_budget(&db, solution).await?;
        assert!(solution.is_solution());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_pricing_validation() -> Result<()> {
        let (db, budget) = setup_with_budget().await?;

        let negative = update_pricing(
            &db,
            budget.id,
            PricingInput {
                price: 100.0,
                price_by_stage: [100.0, -1.0, 0.0].into(),
                discount_by_stages: StageValues::ZERO,
                discount_title: None,
            },
        )
        .await;
        assert!(matches!(negative, Err(Error::InvalidAmount { amount }) if amount == -1.0));

        let too_much = update_pricing(
            &db,
            budget.id,
            PricingInput {
                price: 100.0,
                price_by_stage: [100.0, 0.0, 0.0].into(),
                discount_by_stages: [150.0, 0.0, 0.0].into(),
                discount_title: None,
            },
        )
        .await;
        assert!(matches!(
            too_much,
            Err(Error::Validation {
                field: "discount_by_stages",
                ..
            })
        ));

        let updated = update_pricing(
            &db,
            budget.id,
            PricingInput {
                price: 100.0,
                price_by_stage: [100.0, 0.0, 0.0].into(),
                discount_by_stages: [5.0, 0.0, 0.0].into(),
                discount_title: Some("Скидка к празднику".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.price_by_stage.0, [100.0, 0.0, 0.0]);
        assert_eq!(updated.discount_title, "Скидка к празднику");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_budget_removes_hierarchy() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        let stage_product = crate::core::stage::add_product(
            &db,
            budget.id,
            1,
            catalog.custom_product.id,
            2.0,
            true,
        )
        .await?;
        crate::core::primitives::refresh_report_primitives(&db, budget.id).await?;

        delete_budget(&db, budget.id).await?;

        assert!(get_budget_by_id(&db, budget.id).await?.is_none());
        assert!(get_stages(&db, budget.id).await?.is_empty());
        assert!(
            StageProduct::find_by_id(stage_product.id)
                .one(&db)
                .await?
                .is_none()
        );
        assert_eq!(StageProductSet::find().all(&db).await?.len(), 0);
        assert_eq!(StageProductSetValue::find().all(&db).await?.len(), 0);
        assert_eq!(ReportPrimitive::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_budget_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_budget(&db, 42).await;
        assert!(matches!(result, Err(Error::BudgetNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_budgets_filters() -> Result<()> {
        let db = setup_test_db().await?;

        let small = create_test_budget(&db, "Баня").await?;

        let mut input = test_budget_input("Коттедж");
        input.area = 180.0;
        input.second_floor_height_min = Some(2.5);
        input.second_floor_height_max = Some(2.7);
        let large = create_budget(&db, input).await?;
        crate::core::pricing::recalculate_budget(&db, large.id).await?;
        crate::core::pricing::recalculate_budget(&db, small.id).await?;

        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        mark_signed(&db, large.id, date).await?;

        let two_floors = list_budgets(
            &db,
            &BudgetFilter {
                floor: Some(FloorCode::Two),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(two_floors.len(), 1);
        assert_eq!(two_floors[0].id, large.id);

        let signed = list_budgets(
            &db,
            &BudgetFilter {
                only_signed: true,
                signed_from: NaiveDate::from_ymd_opt(2024, 5, 21),
                signed_to: NaiveDate::from_ymd_opt(2024, 5, 19),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(signed.len(), 1);

        let outside = list_budgets(
            &db,
            &BudgetFilter {
                signed_from: NaiveDate::from_ymd_opt(2024, 5, 22),
                ..Default::default()
            },
        )
        .await?;
        assert!(outside.is_empty());

        let bracket = list_budgets(&db, &BudgetFilter::default().with_area_bracket((30.0, 50.0)))
            .await?;
        assert!(bracket.is_empty());

        let bracket = list_budgets(&db, &BudgetFilter::default().with_area_bracket((50.0, 70.0)))
            .await?;
        assert_eq!(bracket.len(), 1);
        assert_eq!(bracket[0].id, small.id);

        Ok(())
    }

    #[test]
    fn test_area_brackets() {
        let brackets = area_brackets();
        assert_eq!(brackets.len(), 12);
        assert_eq!(brackets[0], (10.0, 30.0));
        assert_eq!(brackets[11], (230.0, 250.0));
    }
}
