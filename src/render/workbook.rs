//! Engineer spreadsheets.
//!
//! Sheets are sparse grids addressed by zero-based `(row, column)`. Formulas
//! use A1 references and are written out as text, so they survive the CSV
//! round trip into a spreadsheet application.

use super::Engineer;
use crate::{
    core::spreadsheet::{MaterialsView, SalaryRow},
    errors::{Error, Result},
};
use std::{collections::BTreeMap, path::Path};

/// Content of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text
    Text(String),
    /// Numeric value
    Number(f64),
    /// Formula text including the leading `=`
    Formula(String),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Self::Text(s) | Self::Formula(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Sparse worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    cells: BTreeMap<(usize, usize), Cell>,
}

impl Sheet {
    /// Writes a cell, replacing what was there
    pub fn write(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    /// Writes a text cell
    pub fn text(&mut self, row: usize, col: usize, text: impl Into<String>) {
        self.write(row, col, Cell::Text(text.into()));
    }

    /// Cell at a position
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Number of rows up to the last written one
    #[must_use]
    pub fn height(&self) -> usize {
        self.cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0)
    }

    /// Number of columns up to the last written one
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.keys().map(|(_, c)| c + 1).max().unwrap_or(0)
    }

    fn records(&self) -> Vec<Vec<String>> {
        let width = self.width();
        (0..self.height())
            .map(|row| {
                (0..width)
                    .map(|col| self.get(row, col).map(Cell::render).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    fn write_records<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        for record in self.records() {
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Serializes the sheet as CSV text.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes the sheet to a CSV file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        self.write_records(&mut writer)
    }
}

/// Spreadsheet column letters for a zero-based index: `0 -> A`, `26 -> AA`.
#[must_use]
pub fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + u8::try_from(rem).unwrap_or(0));
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// A1 reference of a zero-based cell position
#[must_use]
pub fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_name(col), row + 1)
}

const HEADER_ROW: usize = 2;
const FIRST_DATA_ROW: usize = 3;

const ENGINEER_DUTIES: &str = "В обязанности рабочего входят:
- погрузочно-разгрузочные работы при приеме-передаче материала
- выполнять работы добросовестно и качественно, в соответствии с предписаниями, соблюдением технологии. Любые отклонения могут быть только по согласованию с технадзором
- следить за чистотой и порядком на объекте
- ответственность за инструмент и материал
- сообщать технадзору при обнаружении несостыковок в схемах сборки
- сообщать технадзору, если клиент обратился с просьбой о дополнительных работах, с просьбой внести изменения в проект
- при сдаче объекта рабочий должен:
1. сдать весь оставшийся материал, крепеж и инструмент (если таковой выдала фирма) фирме
2. убрать объект и подготовить мусор к вывозу";

const GENERAL_CONSUMABLES: [(&str, &str); 3] = [
    ("Перчатки", "шт."),
    ("Пакеты для мусора", "шт."),
    ("Леса строительные", "комплект"),
];

fn object_line(sheet: &mut Sheet, project: &str) {
    sheet.text(0, 0, "Объект:");
    sheet.text(0, 1, project);
}

/// Lays out the salary sheet: labour lines priced by formula, their total,
/// the worker duties and the engineer's signature line.
#[must_use]
pub fn salary_sheet(project: &str, rows: &[SalaryRow], engineer: &Engineer) -> Sheet {
    let mut sheet = Sheet::default();
    object_line(&mut sheet, project);

    for (col, title) in [
        "Наименование",
        "ед. изм.",
        "Количество",
        "Расценка, руб.",
        "Стоимость, руб.",
    ]
    .into_iter()
    .enumerate()
    {
        sheet.text(HEADER_ROW, col, title);
    }

    let mut row = FIRST_DATA_ROW;
    for line in rows {
        sheet.text(row, 0, line.name.clone());
        sheet.text(row, 1, line.unit.clone());
        sheet.write(row, 2, Cell::Number(line.quantity));
        sheet.write(row, 3, Cell::Number(line.price));
        sheet.write(
            row,
            4,
            Cell::Formula(format!("={}*{}", cell_ref(row, 2), cell_ref(row, 3))),
        );
        row += 1;
    }

    sheet.text(row, 3, "Итого:");
    let total = if rows.is_empty() {
        Cell::Number(0.0)
    } else {
        Cell::Formula(format!(
            "=SUM({}:{})",
            cell_ref(FIRST_DATA_ROW, 4),
            cell_ref(row - 1, 4)
        ))
    };
    sheet.write(row, 4, total);

    row += 1;
    sheet.text(row, 0, ENGINEER_DUTIES);

    row += 5;
    sheet.text(row, 0, "Технадзор:");
    sheet.text(row, 1, format!("{} {}", engineer.full_name, engineer.phone));

    sheet
}

/// Lays out the materials sheet: one quantity column per product and a total
/// column, categories as section rows, then the general consumables.
#[must_use]
pub fn materials_sheet(project: &str, view: &MaterialsView) -> Sheet {
    let mut sheet = Sheet::default();
    object_line(&mut sheet, project);

    sheet.text(HEADER_ROW, 0, "Наименование");
    sheet.text(HEADER_ROW, 1, "ед. изм.");
    for (i, product) in view.products.iter().enumerate() {
        sheet.text(HEADER_ROW, 2 + i, product.clone());
    }
    let total_col = 2 + view.products.len();
    sheet.text(HEADER_ROW, total_col, "Общее количество");

    let mut row = FIRST_DATA_ROW;
    for category in &view.categories {
        sheet.text(row, 0, category.name.clone());
        row += 1;
        for line in &category.rows {
            sheet.text(row, 0, line.name.clone());
            sheet.text(row, 1, line.unit.clone());
            for (i, quantity) in line.quantities.iter().enumerate() {
                sheet.write(row, 2 + i, Cell::Number(*quantity));
            }
            let total = if view.products.is_empty() {
                Cell::Number(0.0)
            } else {
                Cell::Formula(format!(
                    "=SUM({}:{})",
                    cell_ref(row, 2),
                    cell_ref(row, total_col - 1)
                ))
            };
            sheet.write(row, total_col, total);
            row += 1;
        }
    }

    row += 1;
    sheet.text(row, 0, "Общестроительные элементы:");
    for (name, unit) in GENERAL_CONSUMABLES {
        row += 1;
        sheet.text(row, 0, name);
        sheet.text(row, 1, unit);
    }

    sheet
}
