use colored::Colorize;
use prettytable::{Cell, Row, Table};

use crate::declare::QuoteRecord;

/// 表格的欄位，最前面另有自動編號欄
pub const HEADERS: [&str; 7] = ["Code", "Name", "Yesterday", "Current", "Open", "High", "Low"];

/// 相對於昨收的漲跌幅 (%)，四捨五入到小數第二位
///
/// 昨收為零時沒有基準，一律回傳 0。
pub fn percent_change(price: f64, pre_close: f64) -> f64 {
    if pre_close == 0.0 || !pre_close.is_finite() || !price.is_finite() {
        return 0.0;
    }

    let pct = ((price - pre_close) / pre_close * 10000.0).round() / 100.0;
    // 避免印出 -0.00%
    if pct == 0.0 {
        0.0
    } else {
        pct
    }
}

/// 一筆報價相對於昨收的四個漲跌幅
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deltas {
    pub close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

impl Deltas {
    pub fn of(record: &QuoteRecord) -> Self {
        Deltas {
            close: percent_change(record.close, record.pre_close),
            open: percent_change(record.open, record.pre_close),
            high: percent_change(record.high, record.pre_close),
            low: percent_change(record.low, record.pre_close),
        }
    }
}

/// `9.760 [-3.08%]`
fn price_text(price: f64, pct: f64) -> String {
    format!("{:.3} [{:.2}%]", price, pct)
}

/// 漲為紅、跌為綠、平盤不上色
fn price_cell(price: f64, pct: f64, colorize: bool) -> Cell {
    let text = price_text(price, pct);
    let text = match (colorize, pct) {
        (true, p) if p > 0.0 => text.red().to_string(),
        (true, p) if p < 0.0 => text.green().to_string(),
        _ => text,
    };

    Cell::new(&text).style_spec("r")
}

/// 將報價轉成對齊好的文字表格，結尾不含換行
pub fn build(records: &[QuoteRecord], colorize: bool) -> String {
    let mut table = Table::new();

    let mut titles = vec![Cell::new("#").style_spec("c")];
    titles.extend(HEADERS.iter().map(|h| Cell::new(h).style_spec("c")));
    table.set_titles(Row::new(titles));

    for (index, record) in records.iter().enumerate() {
        let deltas = Deltas::of(record);
        table.add_row(Row::new(vec![
            Cell::new(&(index + 1).to_string()).style_spec("r"),
            Cell::new(&record.code),
            Cell::new(&record.name),
            Cell::new(&format!("{:.3}", record.pre_close)).style_spec("r"),
            price_cell(record.close, deltas.close, colorize),
            price_cell(record.open, deltas.open, colorize),
            price_cell(record.high, deltas.high, colorize),
            price_cell(record.low, deltas.low, colorize),
        ]));
    }

    table
        .to_string()
        .trim_end_matches(['\r', '\n'])
        .to_string()
}
