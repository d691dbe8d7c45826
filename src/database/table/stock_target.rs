use anyhow::Result;
use sqlx::SqlitePool;

/// 財報指標資料列（`stock_target`），例如營業收入、每股盈餘。
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct StockTarget {
    pub id: i64,
    pub name: String,
}

impl StockTarget {
    pub fn new(name: String) -> Self {
        StockTarget {
            id: Default::default(),
            name,
        }
    }

    /// 新增指標，名稱已存在時沿用原本的 id
    pub async fn upsert(&mut self, pool: &SqlitePool) -> Result<i64> {
        sqlx::query("INSERT INTO stock_target (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(&self.name)
            .execute(pool)
            .await?;

        self.id = sqlx::query_scalar("SELECT id FROM stock_target WHERE name = ?")
            .bind(&self.name)
            .fetch_one(pool)
            .await?;

        Ok(self.id)
    }

    /// 取得所有指標，id 的順序就是報表中指標的順序
    pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<StockTarget>> {
        Ok(
            sqlx::query_as::<_, StockTarget>("SELECT id, name FROM stock_target ORDER BY id")
                .fetch_all(pool)
                .await?,
        )
    }

    /// 只取名稱，順序同 [`StockTarget::fetch_all`]
    pub async fn list_names(pool: &SqlitePool) -> Result<Vec<String>> {
        Ok(Self::fetch_all(pool)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect())
    }
}
