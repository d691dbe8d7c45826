use anyhow::Result;
use rand::Rng;

use crate::{
    database::{
        table::{
            stock::Stock,
            stock_data::StockData,
            stock_target::StockTarget,
        },
        Sqlite,
    },
    export::period::PERIODS,
    logging,
};

/// 資料庫沒有指標時建立的預設指標
const DEFAULT_TARGETS: [&str; 9] = [
    "营业总收入",
    "营业收入",
    "营业成本",
    "营业利润",
    "利润总额",
    "净利润",
    "基本每股收益",
    "净资产收益率",
    "经营活动现金流量净额",
];

/// 以亂數填入示範用的財報數值，回傳新增的筆數
///
/// 沒有指標時先建立預設指標，公司不足 `stocks` 家時補齊，
/// 再為前 `stocks` 家公司的每一個期別、每一個指標寫入 0 到 99 的整數。
pub async fn run(db: &Sqlite, stocks: usize) -> Result<u64> {
    let mut targets = StockTarget::fetch_all(db.pool()).await?;
    if targets.is_empty() {
        for name in DEFAULT_TARGETS {
            StockTarget::new(name.to_string()).upsert(db.pool()).await?;
        }
        targets = StockTarget::fetch_all(db.pool()).await?;
    }

    let existing = Stock::list_active(db.pool(), None).await?.len();
    for index in existing..stocks {
        Stock::new(format!("股票{}", index + 1))
            .insert(db.pool())
            .await?;
    }

    let active = Stock::list_active(db.pool(), Some(stocks as i64)).await?;
    let mut rng = rand::rng();
    let mut entities = Vec::with_capacity(active.len() * PERIODS.len() * targets.len());

    for stock in &active {
        for period in PERIODS {
            for target in &targets {
                entities.push(StockData::new(
                    stock.id,
                    period.to_string(),
                    target.id,
                    rng.random_range(0..100) as f64,
                ));
            }
        }
    }

    let affected = StockData::insert_many(db.pool(), &entities).await?;
    logging::info_file_async(format!(
        "seed {} rows for {} stocks and {} targets",
        affected,
        active.len(),
        targets.len()
    ));

    Ok(affected)
}
