//! Stage business logic - placing products into stages and pricing stages.
//!
//! Custom products get one selection row per catalog product set, seeded from
//! the product's templates, with the first set selected. Selecting another set
//! clears the previous choice in the same transaction, so a stored custom
//! stage product never has more than one selected set.

use crate::{
    core::{
        budget::{STAGE_COUNT, get_stage},
        catalog::{get_product_by_id, get_product_sets, get_product_templates},
        pricing::{round2, stage_discount},
        stage_text::{StageText, stage_index, stage_text},
    },
    entities::{
        Budget, Stage, StageProduct, StageProductSet, StageProductSetValue, StageValues, budget,
        stage, stage_product, stage_product_set, stage_product_set_value,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Stage shown while a budget has not been saved yet
#[derive(Debug, Clone, PartialEq)]
pub struct StageDraft {
    /// Stage ordinal
    pub number: i32,
    /// Editing labels
    pub text: &'static StageText,
    /// Always zero for a draft
    pub price: f64,
    /// Always zero for a draft
    pub price_with_discount: f64,
    /// Always empty for a draft
    pub product_ids: Vec<i64>,
}

/// The three empty stages of an unsaved budget.
#[must_use]
pub fn blank_stages() -> Vec<StageDraft> {
    (1..=STAGE_COUNT)
        .filter_map(|number| {
            stage_text(number).map(|text| StageDraft {
                number,
                text,
                price: 0.0,
                price_with_discount: 0.0,
                product_ids: Vec::new(),
            })
        })
        .collect()
}

/// Places a catalog product into a stage of a budget.
///
/// The unit price is captured from the product at this moment, with or
/// without installation.
///
/// # Errors
/// Returns an error if the quantity is negative or not finite, or if the stage
/// or product does not exist.
pub async fn add_product(
    db: &DatabaseConnection,
    budget_id: i64,
    stage_number: i32,
    product_id: i64,
    quantity: f64,
    with_work: bool,
) -> Result<stage_product::Model> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::InvalidAmount { amount: quantity });
    }

    let txn = db.begin().await?;

    let stage = get_stage(&txn, budget_id, stage_number).await?;
    let product = get_product_by_id(&txn, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    let price = if with_work {
        product.price
    } else {
        product.price_without_work
    };

    let stage_product = stage_product::ActiveModel {
        stage_id: Set(stage.id),
        product_id: Set(product.id),
        quantity: Set(quantity),
        with_work: Set(with_work),
        price: Set(price),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if product.custom {
        let sets = get_product_sets(&txn, product.id).await?;
        let templates = get_product_templates(&txn, product.id).await?;

        for (position, set) in sets.iter().enumerate() {
            let row = stage_product_set::ActiveModel {
                stage_product_id: Set(stage_product.id),
                product_set_id: Set(set.id),
                selected: Set(position == 0),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            for template in &templates {
                stage_product_set_value::ActiveModel {
                    stage_product_set_id: Set(row.id),
                    product_template_id: Set(template.id),
                    constructor_object_id: Set(template.constructor_object_id),
                    quantity: Set(template.quantity),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }
        debug!(
            stage_product_id = stage_product.id,
            sets = sets.len(),
            "Seeded product sets"
        );
    }

    txn.commit().await?;
    info!(
        budget_id,
        stage_number,
        product_id,
        "Product added to stage"
    );
    Ok(stage_product)
}

/// Makes one product set the only selected set of a custom stage product.
///
/// # Errors
/// Returns [`Error::ProductSetNotFound`] if the set is not offered for this
/// stage product.
pub async fn select_product_set(
    db: &DatabaseConnection,
    stage_product_id: i64,
    product_set_id: i64,
) -> Result<stage_product_set::Model> {
    let txn = db.begin().await?;

    let target = StageProductSet::find()
        .filter(stage_product_set::Column::StageProductId.eq(stage_product_id))
        .filter(stage_product_set::Column::ProductSetId.eq(product_set_id))
        .one(&txn)
        .await?
        .ok_or(Error::ProductSetNotFound {
            stage_product_id,
            product_set_id,
        })?;

    StageProductSet::update_many()
        .col_expr(stage_product_set::Column::Selected, Expr::value(false))
        .filter(stage_product_set::Column::StageProductId.eq(stage_product_id))
        .exec(&txn)
        .await?;

    let mut target: stage_product_set::ActiveModel = target.into();
    target.selected = Set(true);
    let target = target.update(&txn).await?;

    txn.commit().await?;
    Ok(target)
}

/// Fills a template slot of one product set with a primitive and quantity.
///
/// # Errors
/// Returns an error if the quantity is invalid, the set is not offered for the
/// stage product, or the set has no value for the template.
pub async fn set_slot_value(
    db: &DatabaseConnection,
    stage_product_id: i64,
    product_set_id: i64,
    product_template_id: i64,
    constructor_object_id: i64,
    quantity: f64,
) -> Result<stage_product_set_value::Model> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::InvalidAmount { amount: quantity });
    }

    let set = StageProductSet::find()
        .filter(stage_product_set::Column::StageProductId.eq(stage_product_id))
        .filter(stage_product_set::Column::ProductSetId.eq(product_set_id))
        .one(db)
        .await?
        .ok_or(Error::ProductSetNotFound {
            stage_product_id,
            product_set_id,
        })?;

    let mut value: stage_product_set_value::ActiveModel = StageProductSetValue::find()
        .filter(stage_product_set_value::Column::StageProductSetId.eq(set.id))
        .filter(stage_product_set_value::Column::ProductTemplateId.eq(product_template_id))
        .one(db)
        .await?
        .ok_or(Error::CatalogObjectNotFound {
            kind: "product template",
            id: product_template_id,
        })?
        .into();

    value.constructor_object_id = Set(constructor_object_id);
    value.quantity = Set(quantity);
    value.update(db).await.map_err(Into::into)
}

/// Stage products of a stage ordered by id.
pub async fn get_stage_products(
    db: &DatabaseConnection,
    stage_id: i64,
) -> Result<Vec<stage_product::Model>> {
    StageProduct::find()
        .filter(stage_product::Column::StageId.eq(stage_id))
        .order_by_asc(stage_product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes a stage product with its set selections.
///
/// # Errors
/// Returns [`Error::StageProductNotFound`] if it does not exist.
pub async fn remove_stage_product(db: &DatabaseConnection, stage_product_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    StageProduct::find_by_id(stage_product_id)
        .one(&txn)
        .await?
        .ok_or(Error::StageProductNotFound {
            id: stage_product_id,
        })?;

    delete_stage_product_rows(&txn, vec![stage_product_id]).await?;
    txn.commit().await?;
    Ok(())
}

/// Deletes stage products and everything they own, children first.
pub(crate) async fn delete_stage_product_rows<C>(db: &C, stage_product_ids: Vec<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let set_ids: Vec<i64> = StageProductSet::find()
        .filter(stage_product_set::Column::StageProductId.is_in(stage_product_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    StageProductSetValue::delete_many()
        .filter(stage_product_set_value::Column::StageProductSetId.is_in(set_ids))
        .exec(db)
        .await?;
    StageProductSet::delete_many()
        .filter(stage_product_set::Column::StageProductId.is_in(stage_product_ids.clone()))
        .exec(db)
        .await?;
    StageProduct::delete_many()
        .filter(stage_product::Column::Id.is_in(stage_product_ids))
        .exec(db)
        .await?;
    Ok(())
}

/// Recomputes stage prices from their products and writes the per-stage
/// prices and their total back to the budget.
///
/// A stage's price is the sum of unit price × quantity of its products; its
/// discounted price subtracts that stage's discount percentage.
///
/// # Errors
/// Returns [`Error::BudgetNotFound`] if the budget does not exist.
pub async fn recompute_stage_prices(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<budget::Model> {
    let txn = db.begin().await?;

    let budget = Budget::find_by_id(budget_id)
        .one(&txn)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;
    let stages = Stage::find()
        .filter(stage::Column::BudgetId.eq(budget_id))
        .order_by_asc(stage::Column::Number)
        .all(&txn)
        .await?;

    let mut price_by_stage = budget.price_by_stage.0;
    for stage in stages {
        let Some(index) = stage_index(stage.number) else {
            continue;
        };
        let price = round2(
            StageProduct::find()
                .filter(stage_product::Column::StageId.eq(stage.id))
                .all(&txn)
                .await?
                .iter()
                .map(|sp| sp.price * sp.quantity)
                .sum(),
        );
        let discount = stage_discount(price, budget.discount_by_stages.0[index]);
        price_by_stage[index] = price;

        let mut active: stage::ActiveModel = stage.into();
        active.price = Set(price);
        active.price_with_discount = Set(price - discount);
        active.update(&txn).await?;
    }

    let price_by_stage = StageValues(price_by_stage);
    let mut active: budget::ActiveModel = budget.into();
    active.price_by_stage = Set(price_by_stage);
    active.price = Set(price_by_stage.total());
    let budget = active.update(&txn).await?;

    txn.commit().await?;
    info!(budget_id, total = budget.price, "Stage prices recomputed");
    Ok(budget)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::budget::{PricingInput, get_stages, update_pricing};
    use crate::test_utils::*;

    #[test]
    fn test_blank_stages() {
        let stages = blank_stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].number, 1);
        assert_eq!(stages[2].text.name, "Третий этап");
        assert!(stages.iter().all(|s| s.product_ids.is_empty() && s.price == 0.0));
    }

    #[tokio::test]
    async fn test_add_standard_product() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;

        let with_work =
            add_product(&db, budget.id, 1, catalog.standard_product.id, 10.0, true).await?;
        assert_eq!(with_work.price, 1000.0);
        assert!(with_work.with_work);

        let without_work =
            add_product(&db, budget.id, 1, catalog.standard_product.id, 10.0, false).await?;
        assert_eq!(without_work.price, 700.0);

        assert!(StageProductSet::find().all(&db).await?.is_empty());

        let stage = get_stage(&db, budget.id, 1).await?;
        assert_eq!(get_stage_products(&db, stage.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_custom_product_seeds_sets() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;

        let stage_product =
            add_product(&db, budget.id, 2, catalog.custom_product.id, 3.0, true).await?;

        let sets = StageProductSet::find()
            .filter(stage_product_set::Column::StageProductId.eq(stage_product.id))
            .order_by_asc(stage_product_set::Column::Id)
            .all(&db)
            .await?;
        assert_eq!(sets.len(), 2);
        assert!(sets[0].selected);
        assert!(!sets[1].selected);
        assert_eq!(sets[0].product_set_id, catalog.pine_set.id);

        let values = StageProductSetValue::find().all(&db).await?;
        assert_eq!(values.len(), 6);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_errors() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;

        let bad_stage = add_product(&db, budget.id, 4, catalog.standard_product.id, 1.0, true).await;
        assert!(matches!(
            bad_stage,
            Err(Error::StageNotFound { number: 4, .. })
        ));

        let bad_product = add_product(&db, budget.id, 1, 999, 1.0, true).await;
        assert!(matches!(bad_product, Err(Error::ProductNotFound { id: 999 })));

        let bad_quantity =
            add_product(&db, budget.id, 1, catalog.standard_product.id, -1.0, true).await;
        assert!(matches!(bad_quantity, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_select_product_set_keeps_single_selection() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        let stage_product =
            add_product(&db, budget.id, 1, catalog.custom_product.id, 1.0, true).await?;

        let selected = select_product_set(&db, stage_product.id, catalog.larch_set.id).await?;
        assert!(selected.selected);

        let selected_rows = StageProductSet::find()
            .filter(stage_product_set::Column::StageProductId.eq(stage_product.id))
            .filter(stage_product_set::Column::Selected.eq(true))
            .all(&db)
            .await?;
        assert_eq!(selected_rows.len(), 1);
        assert_eq!(selected_rows[0].product_set_id, catalog.larch_set.id);

        let missing = select_product_set(&db, stage_product.id, 999).await;
        assert!(matches!(missing, Err(Error::ProductSetNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_slot_value() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        let stage_product =
            add_product(&db, budget.id, 1, catalog.custom_product.id, 1.0, true).await?;

        let value = set_slot_value(
            &db,
            stage_product.id,
            catalog.larch_set.id,
            catalog.cladding_template.id,
            catalog.larch.id,
            2.5,
        )
        .await?;
        assert_eq!(value.constructor_object_id, catalog.larch.id);
        assert_eq!(value.quantity, 2.5);

        let missing = set_slot_value(&db, stage_product.id, catalog.larch_set.id, 999, 1, 1.0).await;
        assert!(matches!(
            missing,
            Err(Error::CatalogObjectNotFound { id: 999, .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_stage_product() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        let stage_product =
            add_product(&db, budget.id, 1, catalog.custom_product.id, 1.0, true).await?;

        remove_stage_product(&db, stage_product.id).await?;
        assert!(StageProductSet::find().all(&db).await?.is_empty());
        assert!(StageProductSetValue::find().all(&db).await?.is_empty());

        let again = remove_stage_product(&db, stage_product.id).await;
        assert!(matches!(again, Err(Error::StageProductNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_stage_prices() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        update_pricing(
            &db,
            budget.id,
            PricingInput {
                price: 0.0,
                price_by_stage: StageValues::ZERO,
                discount_by_stages: [10.0, 0.0, 0.0].into(),
                discount_title: None,
            },
        )
        .await?;

        add_product(&db, budget.id, 1, catalog.standard_product.id, 10.0, true).await?;
        add_product(&db, budget.id, 2, catalog.custom_product.id, 2.0, false).await?;

        let budget = recompute_stage_prices(&db, budget.id).await?;
        assert_eq!(budget.price_by_stage.0, [10_000.0, 3000.0, 0.0]);
        assert_eq!(budget.price, 13_000.0);

        let stages = get_stages(&db, budget.id).await?;
        assert_eq!(stages[0].price, 10_000.0);
        assert_eq!(stages[0].price_with_discount, 9000.0);
        assert_eq!(stages[1].price_with_discount, 3000.0);
        assert_eq!(stages[2].price, 0.0);

        Ok(())
    }
}
