//! Display strings keyed by stage ordinal (1, 2, 3).

use serde::Serialize;

/// Labels used in the editing view of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageText {
    /// Stage name
    pub name: &'static str,
    /// Label in front of the running total
    pub summ: &'static str,
    /// Suffix of the discount line
    pub summ_dis: &'static str,
    /// Label in front of the discounted running total
    pub discount: &'static str,
}

/// Labels attached to each stage of the export view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageExportText {
    /// Label for the stage's own price
    pub current: &'static str,
    /// Label for the stage discount
    pub discount: &'static str,
    /// Label for the running total
    pub all: &'static str,
}

/// Headings printed above a stage in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageHeading {
    /// Ordinal heading
    pub title: &'static str,
    /// What the stage delivers
    pub name: &'static str,
    /// Dative form of "stage" agreeing with the ordinal
    pub pluralize: &'static str,
}

static STAGE_TEXTS: [StageText; 3] = [
    StageText {
        name: "Первый этап",
        summ: "Итого по первому этапу:",
        summ_dis: "по первому этапу",
        discount: "Итого по первому этапу со скидкой:",
    },
    StageText {
        name: "Второй этап",
        summ: "Итого по двум этапам:",
        summ_dis: "по второму этапу",
        discount: "Итого по двум этапам со скидкой:",
    },
    StageText {
        name: "Третий этап",
        summ: "Итого по трем этапам:",
        summ_dis: "по третьему этапу",
        discount: "Итого по трем этапам со скидкой:",
    },
];

static EXPORT_TEXTS: [StageExportText; 3] = [
    StageExportText {
        current: "Стоимость первого этапа",
        discount: "Скидка по первому этапу",
        all: "Итого по первому этапу",
    },
    StageExportText {
        current: "Стоимость второго этапа",
        discount: "Скидка по второму этапу",
        all: "Итого по двум этапам",
    },
    StageExportText {
        current: "Стоимость третьего этапа",
        discount: "Скидка по третьему этапу",
        all: "Итого по трем этапам",
    },
];

static HEADINGS: [StageHeading; 3] = [
    StageHeading {
        title: "Первый этап",
        name: "Фундамент/коробка/кровля",
        pluralize: "этапу",
    },
    StageHeading {
        title: "Второй этап",
        name: "Под отделку",
        pluralize: "этапам",
    },
    StageHeading {
        title: "Третий этап",
        name: "Под чистовую внутреннюю отделку",
        pluralize: "этапам",
    },
];

/// Array index of a stage ordinal, `None` outside 1..=3
pub(crate) fn stage_index(number: i32) -> Option<usize> {
    match number {
        1..=3 => usize::try_from(number - 1).ok(),
        _ => None,
    }
}

/// Editing labels for a stage, `None` outside 1..=3
#[must_use]
pub fn stage_text(number: i32) -> Option<&'static StageText> {
    stage_index(number).map(|i| &STAGE_TEXTS[i])
}

/// Export labels for a stage, `None` outside 1..=3
#[must_use]
pub fn export_text(number: i32) -> Option<&'static StageExportText> {
    stage_index(number).map(|i| &EXPORT_TEXTS[i])
}

/// Document headings for a stage, `None` outside 1..=3
#[must_use]
pub fn heading(number: i32) -> Option<&'static StageHeading> {
    stage_index(number).map(|i| &HEADINGS[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_cover_all_stages() {
        for number in 1..=3 {
            assert!(stage_text(number).is_some());
            assert!(export_text(number).is_some());
            assert!(heading(number).is_some());
        }
    }

    #[test]
    fn test_lookups_reject_out_of_range() {
        assert!(stage_text(0).is_none());
        assert!(export_text(4).is_none());
        assert!(heading(-1).is_none());
    }

    #[test]
    fn test_lookup_contents() {
        assert_eq!(stage_text(2).map(|t| t.summ), Some("Итого по двум этапам:"));
        assert_eq!(heading(1).map(|h| h.pluralize), Some("этапу"));
        assert_eq!(heading(3).map(|h| h.pluralize), Some("этапам"));
    }
}
