//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Parents are
//! created before children because `SQLite` connections opened through sqlx enforce
//! foreign keys.

use crate::entities::{
    Budget, Category, ConstructorObject, Product, ProductSet, ProductTemplate, ReportPrimitive,
    Stage, StageProduct, StageProductSet, StageProductSetValue, Unit,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/estimates.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Catalog tables come first, then budgets and their stage hierarchy, then the
/// materialized report primitives.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Unit).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, ConstructorObject).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, ProductSet).await?;
    create_table(db, &schema, ProductTemplate).await?;
    create_table(db, &schema, Budget).await?;
    create_table(db, &schema, Stage).await?;
    create_table(db, &schema, StageProduct).await?;
    create_table(db, &schema, StageProductSet).await?;
    create_table(db, &schema, StageProductSetValue).await?;
    create_table(db, &schema, ReportPrimitive).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BudgetModel, StageModel, StageProductSetValueModel, UnitModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UnitModel> = Unit::find().limit(1).all(&db).await?;
        let _: Vec<BudgetModel> = Budget::find().limit(1).all(&db).await?;
        let _: Vec<StageModel> = Stage::find().limit(1).all(&db).await?;
        let _: Vec<StageProductSetValueModel> =
            StageProductSetValue::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
