//! Budget document layout.
//!
//! The document opens with the company header and the budget details, prints
//! one priced table per non-empty stage with the running totals, and closes
//! with the standard terms.

use super::{
    Contact, format_money,
    rtf::{CharStyle, Colour, Document, Justify, PageStyle, ParagraphStyle, Table},
};
use crate::{
    config::CompanyConfig,
    core::{
        export::{ExportView, StageProductView, StageView},
        stage_text::{heading, stage_index},
    },
};
use chrono::{Datelike, NaiveDate};

const FONT: &str = "Times New Roman";

const PAGE: PageStyle = PageStyle {
    width: 11907,
    height: 16840,
    margin_left: 1000,
    margin_right: 1000,
    margin_top: 1000,
    margin_bottom: 1000,
};

const TITLE: ParagraphStyle = ParagraphStyle {
    justify: Justify::Center,
    space_after: 0,
};
const SUMMARY: ParagraphStyle = ParagraphStyle {
    justify: Justify::Center,
    space_after: 0,
};
const TEXT: ParagraphStyle = ParagraphStyle {
    justify: Justify::Full,
    space_after: 200,
};
const OFFSET: ParagraphStyle = ParagraphStyle {
    justify: Justify::Left,
    space_after: 300,
};

const H3: CharStyle = CharStyle {
    bold: true,
    font_size: Some(36),
    colour: None,
};
const TABLE_HEAD: CharStyle = CharStyle {
    bold: true,
    font_size: Some(24),
    colour: None,
};
const SUMMARY_TEXT: CharStyle = CharStyle {
    bold: true,
    font_size: None,
    colour: None,
};
const DISCOUNT_TEXT: CharStyle = CharStyle {
    bold: true,
    font_size: None,
    colour: Some(Colour(255, 0, 0)),
};
const STAGE_NUMBER: CharStyle = CharStyle {
    bold: false,
    font_size: Some(36),
    colour: Some(Colour(255, 165, 0)),
};
const STAGE_NAME: CharStyle = CharStyle {
    bold: false,
    font_size: Some(36),
    colour: None,
};

const HEADER_WIDTHS: [u32; 3] = [3500, 3500, 3500];
const PRODUCT_WIDTHS: [u32; 2] = [6500, 4000];
const PRODUCT_BORDER: u32 = 5;

/// Area above which the staircase gift is offered
const STAIRCASE_GIFT_AREA: f64 = 99.0;

const MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// `05 марта 2024`
#[must_use]
pub fn russian_date(date: NaiveDate) -> String {
    let month = MONTHS
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{:02} {month} {}", date.day(), date.year())
}

fn header(doc: &mut Document, contact: &Contact, company: &CompanyConfig) {
    let mut table = Table::new(&HEADER_WIDTHS, 0);
    let row = table.add_row();
    row[0].lines(company.address_lines.iter().cloned());
    row[1].text(H3, company.brand.clone());
    row[2].lines(
        company
            .websites
            .iter()
            .cloned()
            .chain([contact.email.clone(), contact.phone.clone()]),
    );
    doc.push_table(table);

    doc.paragraph(TITLE, |p| {
        p.text(H3, "Расчет стоимости строительства")
            .line_break()
            .text(H3, "энергосберегающего жилого дома");
    });
    doc.paragraph(OFFSET, |_| {});
}

fn budget_info(doc: &mut Document, view: &ExportView) {
    let mut lines = vec![format!(
        "Высота потолка первого этажа: {} м",
        view.first_floor_height
    )];
    if view.second_floor_height_min > 0.0 && view.second_floor_height_max > 0.0 {
        lines.push(format!(
            "Высота потолка второго этажа: от {} м до {} м",
            view.second_floor_height_min, view.second_floor_height_max
        ));
    }
    if view.third_floor_height_min > 0.0 && view.third_floor_height_max > 0.0 {
        lines.push(format!(
            "Высота потолка третьего этажа: от {} м до {} м",
            view.third_floor_height_min, view.third_floor_height_max
        ));
    }
    lines.push(format!("Площадь строительства: {} м2", view.area));

    let mut table = Table::new(&HEADER_WIDTHS, 0);
    let row = table.add_row();
    row[0].lines(lines);
    row[2].plain(format!(
        "Дата расчета: {} г.",
        russian_date(view.date.date())
    ));
    doc.push_table(table);
    doc.paragraph(OFFSET, |_| {});
}

fn product_title(product: &StageProductView) -> String {
    if product.custom {
        format!("{} | {}", product.name, product.set_name)
    } else if product.display_components {
        format!("{}, {} {}", product.name, product.quantity, product.unit)
    } else {
        product.name.clone()
    }
}

fn product_table(stage: &StageView) -> Table {
    let mut table = Table::new(&PRODUCT_WIDTHS, PRODUCT_BORDER);
    let head = table.add_row();
    head[0].text(TABLE_HEAD, "Наименование");
    head[1].text(TABLE_HEAD, "Стоимость");

    for product in &stage.products {
        let row = table.add_row();
        let name = &mut row[0];
        name.plain(product_title(product));
        if product.custom && product.display_components {
            for item in &product.items {
                name.line_break()
                    .plain(format!("- {} - {} {}", item.name, item.quantity, item.unit));
            }
        }
        let work = if product.with_work {
            ", монтаж"
        } else {
            ", без монтажа"
        };
        name.line_break()
            .plain(format!("{}{work}", product.description));
        row[1].plain(format_money(product.line_total()));
    }
    table
}

fn stage_section(doc: &mut Document, view: &ExportView, stage: &StageView) {
    let (Some(i), Some(heading)) = (stage_index(stage.number), heading(stage.number)) else {
        return;
    };
    let n = stage.number;

    doc.paragraph(TITLE, |p| {
        p.text(STAGE_NUMBER, heading.title);
    });
    doc.paragraph(TITLE, |p| {
        p.text(STAGE_NAME, heading.name);
    });
    doc.push_table(product_table(stage));

    doc.paragraph(SUMMARY, |p| {
        p.text(
            SUMMARY_TEXT,
            format!(
                "Итого по {n} этапу: {} руб. (~ {} руб. за м2)",
                format_money(view.price_by_stage_aggregated.0[i]),
                format_money(view.price_by_area_per_stage.0[i])
            ),
        );
    });
    if view.discount_amount.0[i] > 0.0 {
        doc.paragraph(SUMMARY, |p| {
            p.text(
                DISCOUNT_TEXT,
                format!(
                    "{} по {n} этапу: -{} руб.",
                    view.discount_title,
                    format_money(view.discount_amount.0[i])
                ),
            );
        });
    }
    doc.paragraph(SUMMARY, |p| {
        p.text(
            SUMMARY_TEXT,
            format!(
                "Итого по {n} {}: {} руб. (~ {} руб. за м2)",
                heading.pluralize,
                format_money(view.price_by_stage_aggregated_discounted.0[i]),
                format_money(view.price_by_area_per_stage_discounted.0[i])
            ),
        );
    });
}

fn closing(doc: &mut Document, view: &ExportView) {
    doc.paragraph(TEXT, |p| {
        p.plain(
            "Доставка по всему Крыму – бесплатно. Гарантия на дом – 10 лет. \
             Срок эксплуатации – 70 лет. Только сертифицированные и качественные \
             строительные материалы.",
        );
    });
    if view.area > STAIRCASE_GIFT_AREA {
        doc.paragraph(TEXT, |p| {
            p.plain("Черновая рабочая лестница из сосны камерной сушки В ПОДАРОК!");
        });
    }
    let third_has_products = view
        .stages
        .iter()
        .any(|s| s.number == 3 && !s.is_empty());
    if third_has_products {
        doc.paragraph(TEXT, |p| {
            p.plain(
                "Внутридомовые инженерные сети (вода, канализация, а также электроразводка \
                 по дому) детально просчитываются после выполнения первого этапа и уточнения \
                 всех деталей с Заказчиком. В общей стоимости здания данные позиции суммарно \
                 занимают ориентировочно 3-6%.",
            );
        });
    }
}

/// Lays out the budget document.
#[must_use]
pub fn budget_document(view: &ExportView, contact: &Contact, company: &CompanyConfig) -> Document {
    let mut doc = Document::new(FONT, PAGE);

    header(&mut doc, contact, company);
    budget_info(&mut doc, view);

    for stage in &view.stages {
        if !stage.is_empty() {
            stage_section(&mut doc, view, stage);
        }
        doc.paragraph(OFFSET, |_| {});
    }

    closing(&mut doc, view);
    doc
}
