//! Projections of a budget for the engineer spreadsheets.
//!
//! The salary view lists labour primitives of the work category. The materials
//! view groups every other primitive by category, with one quantity column per
//! product; the work and stock categories are left out.

use crate::{
    core::{graph::BudgetGraph, primitives::{budget_primitives, stage_product_primitives}},
    errors::Result,
};
use serde::Serialize;

/// One labour line of the salary sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryRow {
    /// Primitive name
    pub name: String,
    /// Unit name
    pub unit: String,
    /// Total quantity over the budget
    pub quantity: f64,
    /// Rate per unit
    pub price: f64,
}

/// Salary projection: work-category primitives with a non-zero quantity.
pub fn salary_view(graph: &BudgetGraph, work_category_id: i64) -> Result<Vec<SalaryRow>> {
    let mut rows = Vec::new();
    for (primitive_id, quantity) in budget_primitives(graph, true)?.iter() {
        let primitive = graph.catalog.resolve_primitive(primitive_id)?;
        if primitive.category_id != work_category_id || quantity == 0.0 {
            continue;
        }
        rows.push(SalaryRow {
            name: primitive.name,
            unit: primitive.unit,
            quantity,
            price: primitive.price,
        });
    }
    Ok(rows)
}

/// One primitive line of the materials sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRow {
    /// Primitive name
    pub name: String,
    /// Unit name
    pub unit: String,
    /// Quantity per product, aligned with [`MaterialsView::products`]
    pub quantities: Vec<f64>,
}

impl MaterialRow {
    /// Sum over all products
    #[must_use]
    pub fn total(&self) -> f64 {
        self.quantities.iter().sum()
    }
}

/// A category heading with its primitive lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialCategory {
    /// Category name
    pub name: String,
    /// Primitive lines with a non-zero quantity
    pub rows: Vec<MaterialRow>,
}

/// Materials projection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterialsView {
    /// Product names, each listed once in first-seen order
    pub products: Vec<String>,
    /// Categories in first-seen order
    pub categories: Vec<MaterialCategory>,
}

#[derive(Debug)]
struct PendingRow {
    name: String,
    unit: String,
    by_product: Vec<(String, f64)>,
}

/// Builds the materials projection of a budget.
///
/// Quantities of the same primitive in the same product add up. Categories
/// keep every primitive that was seen, but a row is dropped when its quantity
/// is zero for every product.
pub fn materials_view(
    graph: &BudgetGraph,
    work_category_id: i64,
    stock_category_id: i64,
) -> Result<MaterialsView> {
    let mut products: Vec<String> = Vec::new();
    let mut categories: Vec<(String, Vec<PendingRow>)> = Vec::new();

    for node in graph.stage_products() {
        let product_name = graph.catalog.product(node.stage_product.product_id)?.name.clone();
        if !products.contains(&product_name) {
            products.push(product_name.clone());
        }

        for (primitive_id, quantity) in stage_product_primitives(graph, node, true)?.iter() {
            let primitive = graph.catalog.resolve_primitive(primitive_id)?;
            if primitive.category_id == work_category_id
                || primitive.category_id == stock_category_id
            {
                continue;
            }

            let category_index = match categories.iter().position(|(n, _)| *n == primitive.category) {
                Some(i) => i,
                None => {
                    categories.push((primitive.category.clone(), Vec::new()));
                    categories.len() - 1
                }
            };
            let rows = &mut categories[category_index].1;
            let row_index = match rows.iter().position(|r| r.name == primitive.name) {
                Some(i) => i,
                None => {
                    rows.push(PendingRow {
                        name: primitive.name.clone(),
                        unit: primitive.unit.clone(),
                        by_product: Vec::new(),
                    });
                    rows.len() - 1
                }
            };
            let by_product = &mut rows[row_index].by_product;
            match by_product.iter_mut().find(|(p, _)| *p == product_name) {
                Some((_, total)) => *total += quantity,
                None => by_product.push((product_name.clone(), quantity)),
            }
        }
    }

    let categories = categories
        .into_iter()
        .map(|(name, rows)| MaterialCategory {
            name,
            rows: rows
                .into_iter()
                .filter(|row| row.by_product.iter().any(|(_, q)| *q > 0.0))
                .map(|row| MaterialRow {
                    quantities: products
                        .iter()
                        .map(|p| {
                            row.by_product
                                .iter()
                                .find(|(name, _)| name == p)
                                .map_or(0.0, |(_, q)| *q)
                        })
                        .collect(),
                    name: row.name,
                    unit: row.unit,
                })
                .collect(),
        })
        .collect();

    Ok(MaterialsView {
        products,
        categories,
    })
}
