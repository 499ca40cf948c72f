//! Unified error type for pricing, persistence and export operations.

use thiserror::Error;

/// All errors surfaced by the crate.
///
/// Nothing here is retried; every failure propagates to the caller, who owns
/// user-facing messaging.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure while writing exports
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet serialization failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export view serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before it reached the database
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Offending field name
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// Money or quantity that is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// No budget with this id
    #[error("Budget not found: {id}")]
    BudgetNotFound {
        /// Budget id
        id: i64,
    },

    /// No stage with this ordinal under the budget
    #[error("Stage {number} not found for budget {budget_id}")]
    StageNotFound {
        /// Owning budget
        budget_id: i64,
        /// Stage ordinal (1..=3)
        number: i32,
    },

    /// No stage product with this id
    #[error("Stage product not found: {id}")]
    StageProductNotFound {
        /// Stage product id
        id: i64,
    },

    /// No catalog product with this id
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product id
        id: i64,
    },

    /// The product set does not belong to the stage product
    #[error("Product set {product_set_id} not found for stage product {stage_product_id}")]
    ProductSetNotFound {
        /// Stage product id
        stage_product_id: i64,
        /// Catalog product set id
        product_set_id: i64,
    },

    /// A referenced catalog row (unit, category, primitive, template) is missing
    #[error("Catalog {kind} not found: {id}")]
    CatalogObjectNotFound {
        /// Kind of catalog row
        kind: &'static str,
        /// Missing id
        id: i64,
    },

    /// A custom stage product has no selected product set
    #[error("Stage product {stage_product_id} has no selected product set")]
    SelectionMissing {
        /// Stage product id
        stage_product_id: i64,
    },

    /// A custom stage product has more than one selected product set
    #[error("Stage product {stage_product_id} has {selected} selected product sets, expected one")]
    SelectionAmbiguous {
        /// Stage product id
        stage_product_id: i64,
        /// How many sets are flagged as selected
        selected: usize,
    },
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
