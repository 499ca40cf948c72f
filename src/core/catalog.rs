//! Catalog business logic - units, categories, primitives and products.
//!
//! Exports resolve every catalog reference through [`CatalogIndex`], a snapshot
//! of the catalog loaded once per export. A reference that cannot be resolved
//! fails the whole export.

use crate::{
    entities::{
        Category, ConstructorObject, Product, ProductSet, ProductTemplate, Unit, category,
        constructor_object, product, product_set, product_template, unit,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

fn validate_name(field: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Creates a measurement unit.
pub async fn create_unit(db: &DatabaseConnection, name: &str) -> Result<unit::Model> {
    validate_name("unit name", name)?;
    unit::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a primitive category.
pub async fn create_category(db: &DatabaseConnection, name: &str) -> Result<category::Model> {
    validate_name("category name", name)?;
    category::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Input for [`create_constructor_object`]
#[derive(Debug, Clone)]
pub struct NewConstructorObject {
    /// Name of the primitive
    pub name: String,
    /// Measurement unit
    pub unit_id: i64,
    /// Category
    pub category_id: i64,
    /// Price per unit including installation
    pub price: f64,
    /// Material-only price per unit
    pub price_without_work: f64,
    /// Whether this is a labour item
    pub work_primitive: bool,
}

/// Creates a primitive after validating its name and prices.
pub async fn create_constructor_object(
    db: &DatabaseConnection,
    input: NewConstructorObject,
) -> Result<constructor_object::Model> {
    validate_name("primitive name", &input.name)?;
    validate_amount(input.price)?;
    validate_amount(input.price_without_work)?;

    constructor_object::ActiveModel {
        name: Set(input.name.trim().to_string()),
        unit_id: Set(input.unit_id),
        category_id: Set(input.category_id),
        price: Set(input.price),
        price_without_work: Set(input.price_without_work),
        work_primitive: Set(input.work_primitive),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Input for [`create_product`]
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Description printed in the report
    pub description: String,
    /// Editing hint
    pub hint: String,
    /// Measurement unit
    pub unit_id: i64,
    /// Price per unit including installation
    pub price: f64,
    /// Price per unit without installation
    pub price_without_work: f64,
    /// Margin
    pub profit: f64,
    /// Assembled from a chosen product set
    pub custom: bool,
    /// Print components in the report
    pub display_components: bool,
}

/// Creates a catalog product after validating its name and prices.
pub async fn create_product(db: &DatabaseConnection, input: NewProduct) -> Result<product::Model> {
    validate_name("product name", &input.name)?;
    validate_amount(input.price)?;
    validate_amount(input.price_without_work)?;

    product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        hint: Set(input.hint),
        unit_id: Set(input.unit_id),
        price: Set(input.price),
        price_without_work: Set(input.price_without_work),
        profit: Set(input.profit),
        custom: Set(input.custom),
        display_components: Set(input.display_components),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Adds a named set to a custom product.
pub async fn create_product_set(
    db: &DatabaseConnection,
    product_id: i64,
    name: &str,
) -> Result<product_set::Model> {
    validate_name("product set name", name)?;
    product_set::ActiveModel {
        product_id: Set(product_id),
        name: Set(name.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Adds a component slot to a product with its default primitive and quantity.
pub async fn create_product_template(
    db: &DatabaseConnection,
    product_id: i64,
    name: &str,
    constructor_object_id: i64,
    quantity: f64,
) -> Result<product_template::Model> {
    validate_name("template name", name)?;
    validate_amount(quantity)?;
    product_template::ActiveModel {
        product_id: Set(product_id),
        name: Set(name.trim().to_string()),
        constructor_object_id: Set(constructor_object_id),
        quantity: Set(quantity),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves a product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sets of a product ordered by id.
pub async fn get_product_sets<C>(db: &C, product_id: i64) -> Result<Vec<product_set::Model>>
where
    C: ConnectionTrait,
{
    ProductSet::find()
        .filter(product_set::Column::ProductId.eq(product_id))
        .order_by_asc(product_set::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Template slots of a product ordered by id.
pub async fn get_product_templates<C>(
    db: &C,
    product_id: i64,
) -> Result<Vec<product_template::Model>>
where
    C: ConnectionTrait,
{
    ProductTemplate::find()
        .filter(product_template::Column::ProductId.eq(product_id))
        .order_by_asc(product_template::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A primitive with its unit and category resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveInfo {
    /// Primitive id
    pub id: i64,
    /// Primitive name
    pub name: String,
    /// Unit name
    pub unit: String,
    /// Price per unit including installation
    pub price: f64,
    /// Material-only price per unit
    pub price_without_work: f64,
    /// Category id
    pub category_id: i64,
    /// Category name
    pub category: String,
    /// Whether this is a labour item
    pub work_primitive: bool,
}

/// In-memory snapshot of the catalog used while shaping exports
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    units: HashMap<i64, unit::Model>,
    categories: HashMap<i64, category::Model>,
    primitives: HashMap<i64, constructor_object::Model>,
    products: HashMap<i64, product::Model>,
    product_sets: HashMap<i64, product_set::Model>,
    templates: HashMap<i64, product_template::Model>,
    templates_by_product: HashMap<i64, Vec<i64>>,
}

impl CatalogIndex {
    /// Loads the whole catalog.
    pub async fn load(db: &DatabaseConnection) -> Result<Self> {
        let mut index = Self::default();
        for unit in Unit::find().all(db).await? {
            index.insert_unit(unit);
        }
        for category in Category::find().all(db).await? {
            index.insert_category(category);
        }
        for primitive in ConstructorObject::find().all(db).await? {
            index.insert_primitive(primitive);
        }
        for product in Product::find().all(db).await? {
            index.insert_product(product);
        }
        for set in ProductSet::find().all(db).await? {
            index.insert_product_set(set);
        }
        for template in ProductTemplate::find()
            .order_by_asc(product_template::Column::Id)
            .all(db)
            .await?
        {
            index.insert_template(template);
        }
        tracing::debug!(
            products = index.products.len(),
            primitives = index.primitives.len(),
            "Catalog loaded"
        );
        Ok(index)
    }

    /// Adds or replaces a unit
    pub fn insert_unit(&mut self, unit: unit::Model) {
        self.units.insert(unit.id, unit);
    }

    /// Adds or replaces a category
    pub fn insert_category(&mut self, category: category::Model) {
        self.categories.insert(category.id, category);
    }

    /// Adds or replaces a primitive
    pub fn insert_primitive(&mut self, primitive: constructor_object::Model) {
        self.primitives.insert(primitive.id, primitive);
    }

    /// Adds or replaces a product
    pub fn insert_product(&mut self, product: product::Model) {
        self.products.insert(product.id, product);
    }

    /// Adds or replaces a product set
    pub fn insert_product_set(&mut self, set: product_set::Model) {
        self.product_sets.insert(set.id, set);
    }

    /// Adds a template; templates of one product keep insertion order
    pub fn insert_template(&mut self, template: product_template::Model) {
        let ids = self
            .templates_by_product
            .entry(template.product_id)
            .or_default();
        if !ids.contains(&template.id) {
            ids.push(template.id);
        }
        self.templates.insert(template.id, template);
    }

    /// Unit name by id
    pub fn unit_name(&self, unit_id: i64) -> Result<&str> {
        self.units
            .get(&unit_id)
            .map(|u| u.name.as_str())
            .ok_or(Error::CatalogObjectNotFound {
                kind: "unit",
                id: unit_id,
            })
    }

    /// Product by id
    pub fn product(&self, product_id: i64) -> Result<&product::Model> {
        self.products
            .get(&product_id)
            .ok_or(Error::ProductNotFound { id: product_id })
    }

    /// Product set by id
    pub fn product_set(&self, product_set_id: i64) -> Result<&product_set::Model> {
        self.product_sets
            .get(&product_set_id)
            .ok_or(Error::CatalogObjectNotFound {
                kind: "product set",
                id: product_set_id,
            })
    }

    /// Template by id
    pub fn template(&self, template_id: i64) -> Result<&product_template::Model> {
        self.templates
            .get(&template_id)
            .ok_or(Error::CatalogObjectNotFound {
                kind: "product template",
                id: template_id,
            })
    }

    /// Templates of a product in insertion order
    pub fn templates_for(&self, product_id: i64) -> Result<Vec<&product_template::Model>> {
        self.templates_by_product
            .get(&product_id)
            .map_or_else(Vec::new, Clone::clone)
            .into_iter()
            .map(|id| self.template(id))
            .collect()
    }

    /// Resolves a primitive with its unit and category names.
    ///
    /// # Errors
    /// Returns [`Error::CatalogObjectNotFound`] if the primitive, its unit or
    /// its category is missing.
    pub fn resolve_primitive(&self, primitive_id: i64) -> Result<PrimitiveInfo> {
        let primitive =
            self.primitives
                .get(&primitive_id)
                .ok_or(Error::CatalogObjectNotFound {
                    kind: "primitive",
                    id: primitive_id,
                })?;
        let category =
            self.categories
                .get(&primitive.category_id)
                .ok_or(Error::CatalogObjectNotFound {
                    kind: "category",
                    id: primitive.category_id,
                })?;

        Ok(PrimitiveInfo {
            id: primitive.id,
            name: primitive.name.clone(),
            unit: self.unit_name(primitive.unit_id)?.to_string(),
            price: primitive.price,
            price_without_work: primitive.price_without_work,
            category_id: category.id,
            category: category.name.clone(),
            work_primitive: primitive.work_primitive,
        })
    }
}

/// Resolves a single primitive straight from the database.
///
/// # Errors
/// Returns [`Error::CatalogObjectNotFound`] if the primitive, its unit or its
/// category does not exist.
pub async fn resolve_primitive(db: &DatabaseConnection, primitive_id: i64) -> Result<PrimitiveInfo> {
    let primitive = ConstructorObject::find_by_id(primitive_id)
        .one(db)
        .await?
        .ok_or(Error::CatalogObjectNotFound {
            kind: "primitive",
            id: primitive_id,
        })?;
    let unit = Unit::find_by_id(primitive.unit_id)
        .one(db)
        .await?
        .ok_or(Error::CatalogObjectNotFound {
            kind: "unit",
            id: primitive.unit_id,
        })?;
    let category = Category::find_by_id(primitive.category_id)
        .one(db)
        .await?
        .ok_or(Error::CatalogObjectNotFound {
            kind: "category",
            id: primitive.category_id,
        })?;

    let mut index = CatalogIndex::default();
    index.insert_unit(unit);
    index.insert_category(category);
    index.insert_primitive(primitive);
    index.resolve_primitive(primitive_id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let unit = create_unit(&db, "шт.").await?;

        let mut input = NewProduct {
            name: "   ".to_string(),
            description: String::new(),
            hint: String::new(),
            unit_id: unit.id,
            price: 10.0,
            price_without_work: 8.0,
            profit: 0.0,
            custom: false,
            display_components: false,
        };
        let result = create_product(&db, input.clone()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        input.name = "Окно".to_string();
        input.price = f64::NAN;
        let result = create_product(&db, input.clone()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        input.price = 10.0;
        let product = create_product(&db, input).await?;
        assert_eq!(product.name, "Окно");
        assert_eq!(get_product_by_id(&db, product.id).await?.unwrap(), product);

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_primitive() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;

        let info = resolve_primitive(&db, catalog.labour.id).await?;
        assert_eq!(info.name, "Монтаж каркаса");
        assert_eq!(info.unit, "м2");
        assert_eq!(info.category_id, catalog.work_category.id);
        assert_eq!(info.category, "Работы");
        assert!(info.work_primitive);

        let missing = resolve_primitive(&db, 9999).await;
        assert!(matches!(
            missing,
            Err(Error::CatalogObjectNotFound {
                kind: "primitive",
                id: 9999
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_index_lookups() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;
        let index = CatalogIndex::load(&db).await?;

        assert_eq!(index.product(catalog.custom_product.id)?.name, "Стены");
        assert_eq!(index.resolve_primitive(catalog.board.id)?.category, "Материалы");

        let templates = index.templates_for(catalog.standard_product.id)?;
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Плита", "Работа"]);

        assert!(index.templates_for(12345)?.is_empty());
        assert!(matches!(
            index.product(12345),
            Err(Error::ProductNotFound { id: 12345 })
        ));
        assert!(matches!(
            index.unit_name(12345),
            Err(Error::CatalogObjectNotFound { kind: "unit", .. })
        ));

        Ok(())
    }
}
