use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;

use crate::{
    config,
    database::{
        table::{
            stock::Stock,
            stock_data::{StockData, StockDataRow},
            stock_target::StockTarget,
        },
        Sqlite,
    },
    export::period::{PERIODS, PERIOD_COUNT},
    logging,
};

/// 報表的期別欄位與其位置
pub mod period;
/// 寫出 xlsx
pub mod xlsx;

/// 報表的一列：一家公司的一個指標在每一期的數值
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: i64,
    pub stock_name: String,
    pub target_name: String,
    /// 位置與 [`period::PERIODS`] 相同，沒有資料的期別為 0
    pub values: [f64; PERIOD_COUNT],
}

impl ReportRow {
    fn new(id: i64, stock_name: &str, target_name: &str) -> Self {
        ReportRow {
            id,
            stock_name: stock_name.to_string(),
            target_name: target_name.to_string(),
            values: [0.0; PERIOD_COUNT],
        }
    }
}

/// 表頭：編號、名稱、指標，之後接上每一個期別
pub fn headers() -> Vec<String> {
    ["ID", "名称", "指标"]
        .iter()
        .chain(PERIODS.iter())
        .map(|h| h.to_string())
        .collect()
}

/// 將一家公司的數值依指標組成報表列
///
/// 列的順序依照 `target_names`，而非資料庫回傳的順序；
/// 沒有任何數值的指標不會產生列。
pub fn assemble(data: &[StockDataRow], target_names: &[String]) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for target_name in target_names {
        let mut row: Option<ReportRow> = None;

        for item in data.iter().filter(|d| &d.target_name == target_name) {
            let row = row.get_or_insert_with(|| {
                ReportRow::new(item.stock_id, &item.stock_name, target_name)
            });

            match period::index_of(&item.period) {
                Some(index) => row.values[index] = item.data,
                None => logging::warn_file_async(format!(
                    "Ignore the unknown period {} of stock {} target {}",
                    item.period, item.stock_id, target_name
                )),
            }
        }

        if let Some(row) = row {
            rows.push(row);
        }
    }

    rows
}

/// 從資料庫讀出所有追蹤中的公司並組成報表列
pub async fn collect(db: &Sqlite, limit: Option<i64>) -> Result<(Vec<ReportRow>, usize)> {
    let target_names = StockTarget::list_names(db.pool()).await?;
    let stocks = Stock::list_active(db.pool(), limit).await?;
    let mut rows = Vec::with_capacity(stocks.len() * target_names.len());

    for stock in &stocks {
        let data = StockData::fetch_by_stock(db.pool(), stock.id)
            .await
            .with_context(|| format!("Failed to read the data of stock {}", stock.id))?;
        rows.extend(assemble(&data, &target_names));
    }

    Ok((rows, target_names.len()))
}

/// 匯出報表，回傳寫出的檔案路徑
///
/// 檔名為 `stock-<unix 時間>.xlsx`，目錄不存在時會自動建立。
pub async fn run(
    db: &Sqlite,
    settings: &config::Export,
    out_dir: Option<&Path>,
    limit: Option<i64>,
) -> Result<PathBuf> {
    let (rows, merge_num) = collect(db, limit).await?;

    let dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&settings.dir));
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create the directory {}", dir.display()))?;

    let path = dir.join(format!("stock-{}.xlsx", Local::now().timestamp()));
    xlsx::write(&rows, &headers(), &settings.title, merge_num, &path)?;

    logging::info_file_async(format!(
        "export {} rows to {}",
        rows.len(),
        path.display()
    ));

    Ok(path)
}
