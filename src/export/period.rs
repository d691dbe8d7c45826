use std::collections::HashMap;

use once_cell::sync::Lazy;

/// 報表中每一列的期別數量
pub const PERIOD_COUNT: usize = 35;

#[rustfmt::skip]
/// 報表的期別欄位，由新到舊，每年依序為四個季度再接全年。
///
/// 同一份清單同時是表頭與 [`crate::export::ReportRow::values`] 的位置。
pub const PERIODS: [&str; PERIOD_COUNT] = [
    "2024Q1", "2024Q2", "2024Q3", "2024Q4", "2024",
    "2023Q1", "2023Q2", "2023Q3", "2023Q4", "2023",
    "2022Q1", "2022Q2", "2022Q3", "2022Q4", "2022",
    "2021Q1", "2021Q2", "2021Q3", "2021Q4", "2021",
    "2020Q1", "2020Q2", "2020Q3", "2020Q4", "2020",
    "2019Q1", "2019Q2", "2019Q3", "2019Q4", "2019",
    "2018Q1", "2018Q2", "2018Q3", "2018Q4", "2018",
];

static INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    PERIODS
        .iter()
        .enumerate()
        .map(|(index, period)| (*period, index))
        .collect()
});

/// 期別在 [`PERIODS`] 中的位置，不在清單內的期別回傳 None
pub fn index_of(period: &str) -> Option<usize> {
    INDEX.get(period).copied()
}
