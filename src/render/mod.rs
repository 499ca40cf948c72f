//! Rendering of exports: the RTF budget document and the engineer
//! spreadsheets, plus writing them to the output directory.

/// Budget document layout
pub mod report;
/// Minimal RTF writer
pub mod rtf;
/// Spreadsheet grids and CSV output
pub mod workbook;

use crate::{
    config::ExportConfig,
    core::{
        export::shape_for_export,
        graph::load_budget_graph,
        spreadsheet::{materials_view, salary_view},
    },
    errors::Result,
};
use num_format::{CustomFormat, Grouping, ToFormattedString};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Author of the document, printed in the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    /// E-mail address
    pub email: String,
    /// Phone number
    pub phone: String,
}

/// Site engineer, printed at the bottom of the salary sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engineer {
    /// Full name
    pub full_name: String,
    /// Phone number
    pub phone: String,
}

/// Formats money with two decimals and a space between thousands:
/// `1234567.891 -> "1 234 567.89"`. Non-finite amounts print as `NaN`, `inf`
/// or `-inf`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let format = CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(" ")
        .build()
        .unwrap_or_default();

    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = match int_part.parse::<u128>() {
        Ok(value) => value.to_formatted_string(&format),
        Err(_) => int_part.to_string(),
    };
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{sign}{grouped}.{frac_part}")
}

/// Files produced by [`write_exports`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// `budget_<id>.rtf`
    pub document: PathBuf,
    /// `engineer_salary_<id>_<date>.csv`
    pub salary: PathBuf,
    /// `engineer_primitives_<id>_<date>.csv`
    pub materials: PathBuf,
}

/// Renders the document and both spreadsheets of a budget into the configured
/// output directory.
///
/// Nothing is written unless the whole budget shapes successfully.
#[instrument(skip(db, config, contact, engineer))]
pub async fn write_exports(
    db: &DatabaseConnection,
    budget_id: i64,
    config: &ExportConfig,
    contact: &Contact,
    engineer: &Engineer,
) -> Result<ExportPaths> {
    let graph = load_budget_graph(db, budget_id).await?;
    let view = shape_for_export(&graph)?;
    let salary = salary_view(&graph, config.work_category_id)?;
    let materials = materials_view(&graph, config.work_category_id, config.stock_category_id)?;

    let document = report::budget_document(&view, contact, &config.company);
    let salary = workbook::salary_sheet(&view.project, &salary, engineer);
    let materials = workbook::materials_sheet(&view.project, &materials);

    std::fs::create_dir_all(&config.output_dir)?;
    let today = chrono::Local::now().date_naive();
    let paths = ExportPaths {
        document: config.output_dir.join(format!("budget_{budget_id}.rtf")),
        salary: config
            .output_dir
            .join(format!("engineer_salary_{budget_id}_{today}.csv")),
        materials: config
            .output_dir
            .join(format!("engineer_primitives_{budget_id}_{today}.csv")),
    };

    std::fs::write(&paths.document, document.to_rtf())?;
    salary.write_csv(&paths.salary)?;
    materials.write_csv(&paths.materials)?;

    info!(
        budget_id,
        document = %paths.document.display(),
        "Exports written"
    );
    Ok(paths)
}
