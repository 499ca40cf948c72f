//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating a small catalog and budgets with sensible defaults.

use crate::{
    core::{
        budget::{self, BudgetKind, NewBudget},
        catalog::{self, NewConstructorObject, NewProduct},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Budget input with sensible defaults.
///
/// # Defaults
/// * kind: estimate for client "Иванов"
/// * area: 50.0
/// * `first_floor_height`: 2.7, no upper floors
/// * `discount_title`: "Скидка"
#[must_use]
pub fn test_budget_input(name: &str) -> NewBudget {
    NewBudget {
        kind: BudgetKind::Estimate,
        name: name.to_string(),
        client: Some("Иванов".to_string()),
        area: 50.0,
        first_floor_height: 2.7,
        second_floor_height_min: None,
        second_floor_height_max: None,
        third_floor_height_min: None,
        third_floor_height_max: None,
        discount_title: "Скидка".to_string(),
    }
}

/// Creates a test budget from [`test_budget_input`].
pub async fn create_test_budget(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::budget::Model> {
    budget::create_budget(db, test_budget_input(name)).await
}

/// Sets up a test database with one budget.
pub async fn setup_with_budget() -> Result<(DatabaseConnection, entities::budget::Model)> {
    let db = setup_test_db().await?;
    let budget = create_test_budget(&db, "Тестовый дом").await?;
    Ok((db, budget))
}

/// Catalog records created by [`create_test_catalog`]
#[derive(Debug, Clone)]
pub struct TestCatalog {
    /// "м2"
    pub unit: entities::unit::Model,
    /// "Работы"
    pub work_category: entities::category::Model,
    /// "Материалы"
    pub material_category: entities::category::Model,
    /// "Склад"
    pub stock_category: entities::category::Model,
    /// Pine board, 500 per m2, 400 without work
    pub board: entities::constructor_object::Model,
    /// Larch board, 800 per m2, 700 without work
    pub larch: entities::constructor_object::Model,
    /// Labour, 300 per m2
    pub labour: entities::constructor_object::Model,
    /// Stock item
    pub nails: entities::constructor_object::Model,
    /// "Перекрытие": 1000 / 700, templates board × 2 and labour × 1
    pub standard_product: entities::product::Model,
    /// "Стены": 2000 / 1500, custom with two sets
    pub custom_product: entities::product::Model,
    /// "Сосна", selected first
    pub pine_set: entities::product_set::Model,
    /// "Лиственница"
    pub larch_set: entities::product_set::Model,
    /// Board × 1.5
    pub cladding_template: entities::product_template::Model,
    /// Nails × 4
    pub fastening_template: entities::product_template::Model,
    /// Labour × 1
    pub mounting_template: entities::product_template::Model,
}

async fn test_primitive(
    db: &DatabaseConnection,
    name: &str,
    unit_id: i64,
    category_id: i64,
    prices: (f64, f64),
    work_primitive: bool,
) -> Result<entities::constructor_object::Model> {
    catalog::create_constructor_object(
        db,
        NewConstructorObject {
            name: name.to_string(),
            unit_id,
            category_id,
            price: prices.0,
            price_without_work: prices.1,
            work_primitive,
        },
    )
    .await
}

async fn test_product(
    db: &DatabaseConnection,
    name: &str,
    unit_id: i64,
    prices: (f64, f64),
    custom: bool,
) -> Result<entities::product::Model> {
    catalog::create_product(
        db,
        NewProduct {
            name: name.to_string(),
            description: format!("{name}, описание"),
            hint: String::new(),
            unit_id,
            price: prices.0,
            price_without_work: prices.1,
            profit: 0.0,
            custom,
            display_components: custom,
        },
    )
    .await
}

/// Creates a small catalog: one unit, work, material and stock categories,
/// four primitives, a standard product and a custom product with two sets.
pub async fn create_test_catalog(db: &DatabaseConnection) -> Result<TestCatalog> {
    let unit = catalog::create_unit(db, "м2").await?;
    let work_category = catalog::create_category(db, "Работы").await?;
    let material_category = catalog::create_category(db, "Материалы").await?;
    let stock_category = catalog::create_category(db, "Склад").await?;

    let board = test_primitive(
        db,
        "Доска сосновая",
        unit.id,
        material_category.id,
        (500.0, 400.0),
        false,
    )
    .await?;
    let larch = test_primitive(
        db,
        "Доска лиственничная",
        unit.id,
        material_category.id,
        (800.0, 700.0),
        false,
    )
    .await?;
    let labour = test_primitive(
        db,
        "Монтаж каркаса",
        unit.id,
        work_category.id,
        (300.0, 0.0),
        true,
    )
    .await?;
    let nails = test_primitive(db, "Гвозди", unit.id, stock_category.id, (10.0, 10.0), false)
        .await?;

    let standard_product = test_product(db, "Перекрытие", unit.id, (1000.0, 700.0), false).await?;
    catalog::create_product_template(db, standard_product.id, "Плита", board.id, 2.0).await?;
    catalog::create_product_template(db, standard_product.id, "Работа", labour.id, 1.0).await?;

    let custom_product = test_product(db, "Стены", unit.id, (2000.0, 1500.0), true).await?;
    let pine_set = catalog::create_product_set(db, custom_product.id, "Сосна").await?;
    let larch_set = catalog::create_product_set(db, custom_product.id, "Лиственница").await?;
    let cladding_template =
        catalog::create_product_template(db, custom_product.id, "Обшивка", board.id, 1.5).await?;
    let fastening_template =
        catalog::create_product_template(db, custom_product.id, "Крепёж", nails.id, 4.0).await?;
    let mounting_template =
        catalog::create_product_template(db, custom_product.id, "Монтаж", labour.id, 1.0).await?;

    Ok(TestCatalog {
        unit,
        work_category,
        material_category,
        stock_category,
        board,
        larch,
        labour,
        nails,
        standard_product,
        custom_product,
        pine_set,
        larch_set,
        cladding_template,
        fastening_template,
        mounting_template,
    })
}

/// Sets up a test database with the test catalog.
pub async fn setup_with_catalog() -> Result<(DatabaseConnection, TestCatalog)> {
    let db = setup_test_db().await?;
    let catalog = create_test_catalog(&db).await?;
    Ok((db, catalog))
}

/// Sets up a test database with the test catalog and one budget.
pub async fn setup_with_catalog_and_budget()
-> Result<(DatabaseConnection, TestCatalog, entities::budget::Model)> {
    let (db, catalog) = setup_with_catalog().await?;
    let budget = create_test_budget(&db, "Тестовый дом").await?;
    Ok((db, catalog, budget))
}
