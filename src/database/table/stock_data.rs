use anyhow::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// 單一公司、單一期別、單一指標的數值（`stock_data`）。
#[derive(Debug, Clone, PartialEq)]
pub struct StockData {
    pub stock_id: i64,
    pub period: String,
    pub target_id: i64,
    pub data: f64,
}

/// 合併公司與指標名稱後的一筆數值，匯出報表時使用
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct StockDataRow {
    pub stock_id: i64,
    pub stock_name: String,
    pub period: String,
    pub target_name: String,
    pub data: f64,
}

impl StockData {
    pub fn new(stock_id: i64, period: String, target_id: i64, data: f64) -> Self {
        StockData {
            stock_id,
            period,
            target_id,
            data,
        }
    }

    /// 以單一 INSERT 批次寫入
    pub async fn insert_many(pool: &SqlitePool, entities: &[StockData]) -> Result<u64> {
        if entities.is_empty() {
            return Ok(0);
        }

        let mut affected = 0;
        // SQLite 單一語句的參數數量有上限，分批寫入
        for chunk in entities.chunks(200) {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO stock_data (stock_id, period, target_id, data) ");
            query_builder.push_values(chunk, |mut b, e| {
                b.push_bind(e.stock_id)
                    .push_bind(&e.period)
                    .push_bind(e.target_id)
                    .push_bind(e.data);
            });

            affected += query_builder.build().execute(pool).await?.rows_affected();
        }

        Ok(affected)
    }

    /// 取得一家公司全部的數值，並帶出公司與指標名稱
    pub async fn fetch_by_stock(pool: &SqlitePool, stock_id: i64) -> Result<Vec<StockDataRow>> {
        let sql = "
SELECT
    d.stock_id,
    s.name AS stock_name,
    d.period,
    t.name AS target_name,
    d.data
FROM stock_data AS d
INNER JOIN stock AS s ON s.id = d.stock_id
INNER JOIN stock_target AS t ON t.id = d.target_id
WHERE d.stock_id = ?
ORDER BY t.id, d.period";

        Ok(sqlx::query_as::<_, StockDataRow>(sql)
            .bind(stock_id)
            .fetch_all(pool)
            .await?)
    }
}
