//! Primitive quantities needed to build a budget, and their materialized copy
//! in `report_primitives`.

use crate::{
    core::graph::{BudgetGraph, StageProductNode, load_budget_graph},
    entities::{ReportPrimitive, report_primitive},
    errors::Result,
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Primitive quantity keyed by primitive id, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveTotals(Vec<(i64, f64)>);

impl PrimitiveTotals {
    /// Adds a quantity to a primitive
    pub fn add(&mut self, constructor_object_id: i64, quantity: f64) {
        match self.0.iter_mut().find(|(id, _)| *id == constructor_object_id) {
            Some((_, total)) => *total += quantity,
            None => self.0.push((constructor_object_id, quantity)),
        }
    }

    /// Adds every quantity of another total
    pub fn merge(&mut self, other: &Self) {
        for &(id, quantity) in &other.0 {
            self.add(id, quantity);
        }
    }

    /// Quantity of one primitive, zero when absent
    #[must_use]
    pub fn get(&self, constructor_object_id: i64) -> f64 {
        self.0
            .iter()
            .find(|(id, _)| *id == constructor_object_id)
            .map_or(0.0, |(_, q)| *q)
    }

    /// `(primitive id, quantity)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct primitives
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no primitive was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Primitives of one placed product, multiplied by its quantity.
///
/// Labour primitives are counted only when `with_work` is requested and the
/// product was placed with installation.
pub fn stage_product_primitives(
    graph: &BudgetGraph,
    node: &StageProductNode,
    with_work: bool,
) -> Result<PrimitiveTotals> {
    let include_work = with_work && node.stage_product.with_work;
    let mut totals = PrimitiveTotals::default();

    for component in node.components(&graph.catalog)? {
        let primitive = graph
            .catalog
            .resolve_primitive(component.constructor_object_id)?;
        if primitive.work_primitive && !include_work {
            continue;
        }
        totals.add(
            primitive.id,
            component.quantity * node.stage_product.quantity,
        );
    }
    Ok(totals)
}

/// Primitives of every placed product of the budget.
pub fn budget_primitives(graph: &BudgetGraph, with_work: bool) -> Result<PrimitiveTotals> {
    let mut totals = PrimitiveTotals::default();
    for node in graph.stage_products() {
        totals.merge(&stage_product_primitives(graph, node, with_work)?);
    }
    Ok(totals)
}

/// Rebuilds the `report_primitives` rows of a budget from its stage products.
///
/// # Errors
/// Returns an error if the budget is missing, a catalog reference cannot be
/// resolved, or a custom product has no single selected set. The stored rows
/// are left untouched in that case.
pub async fn refresh_report_primitives(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Vec<report_primitive::Model>> {
    let graph = load_budget_graph(db, budget_id).await?;
    let totals = budget_primitives(&graph, true)?;
    debug!(budget_id, primitives = totals.len(), "Collected primitives");

    let txn = db.begin().await?;
    ReportPrimitive::delete_many()
        .filter(report_primitive::Column::BudgetId.eq(budget_id))
        .exec(&txn)
        .await?;

    let mut rows = Vec::with_capacity(totals.len());
    for (constructor_object_id, quantity) in totals.iter() {
        let row = report_primitive::ActiveModel {
            budget_id: Set(budget_id),
            constructor_object_id: Set(constructor_object_id),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        rows.push(row);
    }

    txn.commit().await?;
    info!(budget_id, rows = rows.len(), "Report primitives refreshed");
    Ok(rows)
}
