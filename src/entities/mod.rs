//! Entity module - Contains all SeaORM entity definitions for the database.
//! Budgets own stages, stages own stage products, and stage products
//! reference the shared catalog (products, sets, templates, primitives).

pub mod budget;
pub mod category;
pub mod constructor_object;
pub mod product;
pub mod product_set;
pub mod product_template;
pub mod report_primitive;
pub mod stage;
pub mod stage_product;
pub mod stage_product_set;
pub mod stage_product_set_value;
pub mod unit;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel, StageValues};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use constructor_object::{
    Column as ConstructorObjectColumn, Entity as ConstructorObject,
    Model as ConstructorObjectModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_set::{Column as ProductSetColumn, Entity as ProductSet, Model as ProductSetModel};
pub use product_template::{
    Column as ProductTemplateColumn, Entity as ProductTemplate, Model as ProductTemplateModel,
};
pub use report_primitive::{
    Column as ReportPrimitiveColumn, Entity as ReportPrimitive, Model as ReportPrimitiveModel,
};
pub use stage::{Column as StageColumn, Entity as Stage, Model as StageModel};
pub use stage_product::{
    Column as StageProductColumn, Entity as StageProduct, Model as StageProductModel,
};
pub use stage_product_set::{
    Column as StageProductSetColumn, Entity as StageProductSet, Model as StageProductSetModel,
};
pub use stage_product_set_value::{
    Column as StageProductSetValueColumn, Entity as StageProductSetValue,
    Model as StageProductSetValueModel,
};
pub use unit::{Column as UnitColumn, Entity as Unit, Model as UnitModel};
