//! A budget loaded together with its stage hierarchy and a catalog snapshot.
//!
//! Exports, spreadsheets and report primitives all read from this tree so the
//! database is queried once per operation.

use crate::{
    core::catalog::CatalogIndex,
    entities::{
        Budget, Stage, StageProduct, StageProductSet, StageProductSetValue, budget, stage,
        stage_product, stage_product_set, stage_product_set_value,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::HashMap;

/// Budget with everything below it
#[derive(Debug, Clone)]
pub struct BudgetGraph {
    /// Root budget row
    pub budget: budget::Model,
    /// Ordered by stage number
    pub stages: Vec<StageNode>,
    /// Catalog snapshot taken with the budget
    pub catalog: CatalogIndex,
}

/// Stage with its placed products
#[derive(Debug, Clone)]
pub struct StageNode {
    /// Stage row
    pub stage: stage::Model,
    /// Ordered by id
    pub products: Vec<StageProductNode>,
}

/// Placed product with its set selections
#[derive(Debug, Clone)]
pub struct StageProductNode {
    /// Stage product row
    pub stage_product: stage_product::Model,
    /// Ordered by id; empty for standard products
    pub sets: Vec<SetNode>,
}

/// Set offered for a custom product, with its slot values
#[derive(Debug, Clone)]
pub struct SetNode {
    /// Selection row
    pub set: stage_product_set::Model,
    /// Ordered by id
    pub values: Vec<stage_product_set_value::Model>,
}

/// One component slot of a placed product, per unit of that product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    /// Template slot
    pub template_id: i64,
    /// Primitive filling the slot
    pub constructor_object_id: i64,
    /// Primitive quantity per product unit
    pub quantity: f64,
}

impl StageProductNode {
    /// The selected set of a custom product, `None` for standard products.
    ///
    /// # Errors
    /// A custom product needs exactly one selected set: returns
    /// [`Error::SelectionMissing`] or [`Error::SelectionAmbiguous`] otherwise,
    /// and [`Error::ProductNotFound`] if the product is not in the catalog.
    pub fn selected_set(&self, catalog: &CatalogIndex) -> Result<Option<&SetNode>> {
        let product = catalog.product(self.stage_product.product_id)?;
        if !product.custom {
            return Ok(None);
        }

        let selected: Vec<&SetNode> = self.sets.iter().filter(|s| s.set.selected).collect();
        match selected.as_slice() {
            [only] => Ok(Some(*only)),
            [] => Err(Error::SelectionMissing {
                stage_product_id: self.stage_product.id,
            }),
            many => Err(Error::SelectionAmbiguous {
                stage_product_id: self.stage_product.id,
                selected: many.len(),
            }),
        }
    }

    /// Components of one unit of the product: the selected set's values for a
    /// custom product, the catalog templates otherwise.
    pub fn components(&self, catalog: &CatalogIndex) -> Result<Vec<Component>> {
        if let Some(set) = self.selected_set(catalog)? {
            return Ok(set
                .values
                .iter()
                .map(|v| Component {
                    template_id: v.product_template_id,
                    constructor_object_id: v.constructor_object_id,
                    quantity: v.quantity,
                })
                .collect());
        }

        Ok(catalog
            .templates_for(self.stage_product.product_id)?
            .into_iter()
            .map(|t| Component {
                template_id: t.id,
                constructor_object_id: t.constructor_object_id,
                quantity: t.quantity,
            })
            .collect())
    }
}

impl BudgetGraph {
    /// Every stage product of every stage, in stage order
    pub fn stage_products(&self) -> impl Iterator<Item = &StageProductNode> {
        self.stages.iter().flat_map(|s| s.products.iter())
    }
}

fn group_by<T, K>(rows: Vec<T>, key: impl Fn(&T) -> K) -> HashMap<K, Vec<T>>
where
    K: std::hash::Hash + Eq,
{
    let mut grouped: HashMap<K, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

/// Loads a budget with its stages, stage products, sets, values and the catalog.
///
/// # Errors
/// Returns [`Error::BudgetNotFound`] if the budget does not exist.
pub async fn load_budget_graph(db: &DatabaseConnection, budget_id: i64) -> Result<BudgetGraph> {
    let budget = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let stages = Stage::find()
        .filter(stage::Column::BudgetId.eq(budget_id))
        .order_by_asc(stage::Column::Number)
        .all(db)
        .await?;
    let stage_ids: Vec<i64> = stages.iter().map(|s| s.id).collect();

    let stage_products = StageProduct::find()
        .filter(stage_product::Column::StageId.is_in(stage_ids))
        .order_by_asc(stage_product::Column::Id)
        .all(db)
        .await?;
    let stage_product_ids: Vec<i64> = stage_products.iter().map(|sp| sp.id).collect();

    let sets = StageProductSet::find()
        .filter(stage_product_set::Column::StageProductId.is_in(stage_product_ids))
        .order_by_asc(stage_product_set::Column::Id)
        .all(db)
        .await?;
    let set_ids: Vec<i64> = sets.iter().map(|s| s.id).collect();

    let values = StageProductSetValue::find()
        .filter(stage_product_set_value::Column::StageProductSetId.is_in(set_ids))
        .order_by_asc(stage_product_set_value::Column::Id)
        .all(db)
        .await?;

    let mut values = group_by(values, |v| v.stage_product_set_id);
    let mut sets = group_by(sets, |s| s.stage_product_id);
    let mut stage_products = group_by(stage_products, |sp| sp.stage_id);

    let stages = stages
        .into_iter()
        .map(|stage| {
            let products = stage_products
                .remove(&stage.id)
                .unwrap_or_default()
                .into_iter()
                .map(|stage_product| {
                    let sets = sets
                        .remove(&stage_product.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|set| SetNode {
                            values: values.remove(&set.id).unwrap_or_default(),
                            set,
                        })
                        .collect();
                    StageProductNode {
                        stage_product,
                        sets,
                    }
                })
                .collect();
            StageNode { stage, products }
        })
        .collect();

    let catalog = CatalogIndex::load(db).await?;

    Ok(BudgetGraph {
        budget,
        stages,
        catalog,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::stage::add_product;
    use crate::test_utils::*;
    use sea_orm::Set;

    #[tokio::test]
    async fn test_load_budget_graph() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        add_product(&db, budget.id, 1, catalog.standard_product.id, 1.0, true).await?;
        add_product(&db, budget.id, 3, catalog.custom_product.id, 1.0, true).await?;

        let graph = load_budget_graph(&db, budget.id).await?;
        assert_eq!(graph.stages.len(), 3);
        assert_eq!(graph.stages[0].products.len(), 1);
        assert!(graph.stages[1].products.is_empty());
        assert_eq!(graph.stages[2].products[0].sets.len(), 2);
        assert_eq!(graph.stages[2].products[0].sets[0].values.len(), 3);
        assert_eq!(graph.stage_products().count(), 2);

        let missing = load_budget_graph(&db, 999).await;
        assert!(matches!(missing, Err(Error::BudgetNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_components_standard_and_custom() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        add_product(&db, budget.id, 1, catalog.standard_product.id, 1.0, true).await?;
        add_product(&db, budget.id, 1, catalog.custom_product.id, 1.0, true).await?;

        let graph = load_budget_graph(&db, budget.id).await?;
        let standard = &graph.stages[0].products[0];
        let custom = &graph.stages[0].products[1];

        assert!(standard.selected_set(&graph.catalog)?.is_none());
        let components = standard.components(&graph.catalog)?;
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].constructor_object_id, catalog.board.id);
        assert_eq!(components[0].quantity, 2.0);

        let selected = custom.selected_set(&graph.catalog)?.unwrap();
        assert_eq!(selected.set.product_set_id, catalog.pine_set.id);
        assert_eq!(custom.components(&graph.catalog)?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_selection_must_be_unique() -> Result<()> {
        let (db, catalog, budget) = setup_with_catalog_and_budget().await?;
        let stage_product =
            add_product(&db, budget.id, 1, catalog.custom_product.id, 1.0, true).await?;

        let rows = StageProductSet::find()
            .filter(stage_product_set::Column::StageProductId.eq(stage_product.id))
            .all(&db)
            .await?;
        for row in rows {
            let mut active: stage_product_set::ActiveModel = row.into();
            active.selected = Set(true);
            active.update(&db).await?;
        }

        let graph = load_budget_graph(&db, budget.id).await?;
        let node = &graph.stages[0].products[0];
        assert!(matches!(
            node.components(&graph.catalog),
            Err(Error::SelectionAmbiguous { selected: 2, .. })
        ));

        StageProductSet::update_many()
            .col_expr(
                stage_product_set::Column::Selected,
                sea_orm::sea_query::Expr::value(false),
            )
            .exec(&db)
            .await?;

        let graph = load_budget_graph(&db, budget.id).await?;
        assert!(matches!(
            graph.stages[0].products[0].selected_set(&graph.catalog),
            Err(Error::SelectionMissing { .. })
        ));

        Ok(())
    }
}
