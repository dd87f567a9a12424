//! Normalization of the raw trade-summary sheet into instrument records.

use calamine::Data;

use crate::domain::InstrumentRecord;

/// Name of the sheet holding the day's consolidated results.
pub const TRADE_SUMMARY_SHEET: &str = "TRADE_SUMMARY";

/// Banner and header rows preceding the data.
const HEADER_ROWS: usize = 7;

/// Summary rows trailing the data.
const FOOTER_ROWS: usize = 2;

/// Semantic names of the 14 data columns, in document order. The raw
/// sheet carries one disposable index column in front of these.
pub const TRADE_COLUMNS: [&str; 14] = [
    "Код Инструмента",
    "Наименование Инструмента",
    "Базис поставки",
    "Объем Договоров в единицах измерения",
    "Обьем Договоров, руб",
    "Изменение рыночной цены к цене предыдуего дня, руб",
    "Изменение рыночной цены к цене предыдуего дня, %",
    "Цена (за единицу измерения), руб - Минимальная",
    "Цена (за единицу измерения), руб - Средневзвешенная",
    "Цена (за единицу измерения), руб - Максимальная",
    "Цена (за единицу измерения), руб - Рыночная",
    "Цена в Заявках (за единицу измерения) - Лучшее предложение",
    "Цена в Заявках (за единицу измерения) - Лучший спрос",
    "Количество Договоров, шт",
];

const COL_CODE: usize = 0;
const COL_NAME: usize = 1;
const COL_DELIVERY_BASIS: usize = 2;
const COL_PRICE_DELTA: usize = 5;
const COL_AVG_PRICE: usize = 8;

/// Header names of the record fields, in field order.
pub const RECORD_COLUMNS: [&str; 5] = [
    TRADE_COLUMNS[COL_CODE],
    TRADE_COLUMNS[COL_NAME],
    TRADE_COLUMNS[COL_DELIVERY_BASIS],
    TRADE_COLUMNS[COL_AVG_PRICE],
    TRADE_COLUMNS[COL_PRICE_DELTA],
];

/// Literal the exchange prints for an absent value.
const EMPTY_SENTINEL: &str = "-";

/// A raw sheet cell reduced to the shapes normalization cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&Data> for SheetCell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => SheetCell::Empty,
            Data::String(s) => SheetCell::Text(s.clone()),
            Data::Float(f) => SheetCell::Number(*f),
            Data::Int(i) => SheetCell::Number(*i as f64),
            Data::Bool(b) => SheetCell::Text(b.to_string()),
            Data::DateTime(dt) => SheetCell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => SheetCell::Text(s.clone()),
        }
    }
}

/// Normalize raw sheet rows into instrument records.
///
/// Drops the fixed header and footer rows, skips the leading index
/// column, maps the absent-value sentinel to `None`, and coerces the
/// two price columns to numbers. A sheet too short to contain data
/// yields no records. A sheet with an unexpected layout yields wrong
/// records rather than an error.
pub fn normalize_rows(rows: &[Vec<SheetCell>]) -> Vec<InstrumentRecord> {
    let data_end = rows.len().saturating_sub(FOOTER_ROWS);
    let data = if data_end > HEADER_ROWS {
        &rows[HEADER_ROWS..data_end]
    } else {
        &[]
    };

    data.iter()
        .map(|row| InstrumentRecord {
            code: text_cell(row, COL_CODE),
            name: text_cell(row, COL_NAME),
            delivery_basis: text_cell(row, COL_DELIVERY_BASIS),
            avg_price: numeric_cell(row, COL_AVG_PRICE),
            price_delta: numeric_cell(row, COL_PRICE_DELTA),
        })
        .collect()
}

/// Read a text column; the `+ 1` skips the leading index column.
fn text_cell(row: &[SheetCell], column: usize) -> String {
    match row.get(column + 1) {
        Some(SheetCell::Text(s)) => s.clone(),
        Some(SheetCell::Number(n)) => n.to_string(),
        Some(SheetCell::Empty) | None => String::new(),
    }
}

/// Read a numeric column; non-numeric text and the absent-value
/// sentinel both become `None`.
fn numeric_cell(row: &[SheetCell], column: usize) -> Option<f64> {
    match row.get(column + 1) {
        Some(SheetCell::Number(n)) => Some(*n),
        Some(SheetCell::Text(s)) if s == EMPTY_SENTINEL => None,
        Some(SheetCell::Text(s)) => s.trim().parse().ok(),
        Some(SheetCell::Empty) | None => None,
    }
}
