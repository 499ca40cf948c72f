/// Budget creation, pricing inputs, listing and cascade removal
pub mod budget;

/// Catalog records and the in-memory catalog snapshot
pub mod catalog;

/// Export view shaping
pub mod export;

/// Floor-count classification from ceiling heights
pub mod floors;

/// Budget hierarchy loading
pub mod graph;

/// Stage pricing aggregation
pub mod pricing;

/// Primitive collection and report primitive refresh
pub mod primitives;

/// Engineer spreadsheet projections
pub mod spreadsheet;

/// Placing products into stages and pricing stages
pub mod stage;

/// Static stage display strings
pub mod stage_text;
