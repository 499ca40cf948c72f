//! Shapes a budget into the denormalized view consumed by the document and
//! spreadsheet renderers.

use crate::{
    core::{
        catalog::PrimitiveInfo,
        graph::{BudgetGraph, StageNode, StageProductNode, load_budget_graph},
        stage_text::{StageExportText, export_text},
    },
    entities::StageValues,
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, instrument};

/// Everything the budget document prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportView {
    /// Label printed in front of discount lines
    pub discount_title: String,
    /// Discount of each stage in money
    pub discount_amount: StageValues,
    /// Running price up to each stage
    pub price_by_stage_aggregated: StageValues,
    /// Running price per square metre
    pub price_by_area_per_stage: StageValues,
    /// Running price after the discounts so far
    pub price_by_stage_aggregated_discounted: StageValues,
    /// Discounted running price per square metre
    pub price_by_area_per_stage_discounted: StageValues,
    /// Budget name
    pub project: String,
    /// Calculation date
    pub date: NaiveDateTime,
    /// Heated area in square metres
    pub area: f64,
    /// Total price of the budget
    pub price: f64,
    /// First floor height, 0 when not set
    pub first_floor_height: f64,
    /// Lower bound of the second floor height
    pub second_floor_height_min: f64,
    /// Upper bound of the second floor height
    pub second_floor_height_max: f64,
    /// Lower bound of the third floor height
    pub third_floor_height_min: f64,
    /// Upper bound of the third floor height
    pub third_floor_height_max: f64,
    /// More than one stage is active
    pub stages_many: bool,
    /// Sorted by number, prices accumulated from earlier stages
    pub stages: Vec<StageView>,
}

/// One stage of the export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageView {
    /// Stage ordinal, 1 to 3
    pub number: i32,
    /// Price labels of the stage
    pub text: &'static StageExportText,
    /// Running price up to and including this stage
    pub price: f64,
    /// Running discounted price up to and including this stage
    pub price_with_discount: f64,
    /// Products placed in the stage
    pub products: Vec<StageProductView>,
}

impl ExportView {
    /// JSON form of the view for editors and other consumers
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

impl StageView {
    /// A stage without products is kept in the data but not printed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// One placed product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProductView {
    /// Catalog product name
    pub name: String,
    /// Catalog product description
    pub description: String,
    /// Print the component list under the product
    pub display_components: bool,
    /// Product is assembled from a chosen set
    pub custom: bool,
    /// Placed with installation
    pub with_work: bool,
    /// Unit name
    pub unit: String,
    /// Catalog price with installation
    pub price_with_work: f64,
    /// Catalog price without installation
    pub price_without_work: f64,
    /// Unit price captured when the product was placed
    pub price_result: f64,
    /// Quantity truncated to whole units
    pub quantity: i64,
    /// Selected set name, empty for standard products
    pub set_name: String,
    /// All sets offered for a custom product
    pub sets: Vec<ProductSetView>,
    /// Flat component list printed under the product
    pub items: Vec<ComponentView>,
}

impl StageProductView {
    /// Price of the line in the document
    #[must_use]
    pub fn line_total(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let quantity = self.quantity as f64;
        self.price_result * quantity
    }
}

/// A product set offered for a custom product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSetView {
    /// Product set id
    pub id: i64,
    /// Product set name
    pub name: String,
    /// The set chosen for this stage product
    pub selected: bool,
    /// Filled slots of the set
    pub items: Vec<SetItemView>,
}

/// A filled template slot of a product set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetItemView {
    /// Template id
    pub id: i64,
    /// Template name
    pub name: String,
    /// Quantity per unit of product
    pub quantity: f64,
    /// Primitive placed in the slot
    pub value: PrimitiveInfo,
}

/// A component line under a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentView {
    /// Template name
    pub name: String,
    /// Quantity per unit of product
    pub quantity: f64,
    /// Unit of the primitive
    pub unit: String,
}

fn product_view(graph: &BudgetGraph, node: &StageProductNode) -> Result<StageProductView> {
    let catalog = &graph.catalog;
    let stage_product = &node.stage_product;
    let product = catalog.product(stage_product.product_id)?;

    let selected = node.selected_set(catalog)?;
    let set_name = match selected {
        Some(set) => catalog.product_set(set.set.product_set_id)?.name.clone(),
        None => String::new(),
    };

    let sets = if product.custom {
        node.sets
            .iter()
            .map(|set| {
                let items = set
                    .values
                    .iter()
                    .map(|value| {
                        Ok(SetItemView {
                            id: value.product_template_id,
                            name: catalog.template(value.product_template_id)?.name.clone(),
                            quantity: value.quantity,
                            value: catalog.resolve_primitive(value.constructor_object_id)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ProductSetView {
                    id: set.set.product_set_id,
                    name: catalog.product_set(set.set.product_set_id)?.name.clone(),
                    selected: set.set.selected,
                    items,
                })
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    let items = node
        .components(catalog)?
        .into_iter()
        .map(|component| {
            Ok(ComponentView {
                name: catalog.template(component.template_id)?.name.clone(),
                quantity: component.quantity,
                unit: catalog
                    .resolve_primitive(component.constructor_object_id)?
                    .unit,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    #[allow(clippy::cast_possible_truncation)]
    let quantity = stage_product.quantity.floor() as i64;

    Ok(StageProductView {
        name: product.name.clone(),
        description: product.description.clone(),
        display_components: product.display_components,
        custom: product.custom,
        with_work: stage_product.with_work,
        unit: catalog.unit_name(product.unit_id)?.to_string(),
        price_with_work: product.price,
        price_without_work: product.price_without_work,
        price_result: stage_product.price,
        quantity,
        set_name,
        sets,
        items,
    })
}

fn stage_view(graph: &BudgetGraph, node: &StageNode) -> Result<StageView> {
    let text = export_text(node.stage.number).ok_or(Error::StageNotFound {
        budget_id: graph.budget.id,
        number: node.stage.number,
    })?;
    let products = node
        .products
        .iter()
        .map(|p| product_view(graph, p))
        .collect::<Result<Vec<_>>>()?;

    Ok(StageView {
        number: node.stage.number,
        text,
        price: node.stage.price,
        price_with_discount: node.stage.price_with_discount,
        products,
    })
}

/// Builds the export view of a loaded budget.
///
/// Stages are sorted by number and, from the second on, both prices have the
/// previous stage's (already accumulated) discounted price added.
///
/// # Errors
/// Fails on any unresolved catalog reference, on a stage number outside 1..=3
/// and on a custom product without exactly one selected set.
pub fn shape_for_export(graph: &BudgetGraph) -> Result<ExportView> {
    let budget = &graph.budget;

    let mut stages = graph
        .stages
        .iter()
        .map(|s| stage_view(graph, s))
        .collect::<Result<Vec<_>>>()?;
    stages.sort_by_key(|s| s.number);

    for i in 1..stages.len() {
        let carried = stages[i - 1].price_with_discount;
        stages[i].price += carried;
        stages[i].price_with_discount += carried;
    }

    let active = graph.stages.iter().filter(|s| s.stage.active).count();

    Ok(ExportView {
        discount_title: budget.discount_title.clone(),
        discount_amount: budget.discount_amount,
        price_by_stage_aggregated: budget.price_by_stage_aggregated,
        price_by_area_per_stage: budget.price_by_area_per_stage,
        price_by_stage_aggregated_discounted: budget.price_by_stage_aggregated_discounted,
        price_by_area_per_stage_discounted: budget.price_by_area_per_stage_discounted,
        project: budget.name.clone(),
        date: budget.created_at,
        area: budget.area,
        price: budget.price,
        first_floor_height: budget.first_floor_height,
        second_floor_height_min: budget.second_floor_height_min.unwrap_or(0.0),
        second_floor_height_max: budget.second_floor_height_max.unwrap_or(0.0),
        third_floor_height_min: budget.third_floor_height_min.unwrap_or(0.0),
        third_floor_height_max: budget.third_floor_height_max.unwrap_or(0.0),
        stages_many: active > 1,
        stages,
    })
}

/// Loads a budget and shapes it for export.
#[instrument(skip(db))]
pub async fn export_budget(db: &DatabaseConnection, budget_id: i64) -> Result<ExportView> {
    let graph = load_budget_graph(db, budget_id).await?;
    let view = shape_for_export(&graph)?;
    debug!(
        stages = view.stages.len(),
        products = view.stages.iter().map(|s| s.products.len()).sum::<usize>(),
        "Budget shaped for export"
    );
    Ok(view)
}
