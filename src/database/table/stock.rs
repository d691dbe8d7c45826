use anyhow::Result;
use sqlx::SqlitePool;

/// 公司資料列（`stock`）。
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Stock {
    pub id: i64,
    pub name: String,
    /// 1 為仍在追蹤，其他值不會匯出
    pub status: i64,
}

impl Stock {
    pub fn new(name: String) -> Self {
        Stock {
            id: Default::default(),
            name,
            status: 1,
        }
    }

    /// 新增數據到資料庫後回傳新增的 id
    pub async fn insert(&mut self, pool: &SqlitePool) -> Result<i64> {
        let sql = "INSERT INTO stock (name, status) VALUES (?, ?)";
        let result = sqlx::query(sql)
            .bind(&self.name)
            .bind(self.status)
            .execute(pool)
            .await?;

        self.id = result.last_insert_rowid();

        Ok(self.id)
    }

    /// 依 id 順序取得 status = 1 的公司，`limit` 為 None 時全部取出
    pub async fn list_active(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<Stock>> {
        let sql = "
SELECT id, name, status
FROM stock
WHERE status = 1
ORDER BY id
LIMIT ?";

        // SQLite 的 LIMIT -1 代表不限制
        Ok(sqlx::query_as::<_, Stock>(sql)
            .bind(limit.unwrap_or(-1))
            .fetch_all(pool)
            .await?)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM stock")
            .fetch_one(pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Sqlite;

    #[tokio::test]
    async fn test_list_active() {
        let db = Sqlite::memory().await.unwrap();
        db.init_schema().await.unwrap();

        for name in ["平安银行", "万科A", "国华网安"] {
            Stock::new(name.to_string()).insert(db.pool()).await.unwrap();
        }
        let mut delisted = Stock::new("退市公司".to_string());
        delisted.status = 0;
        delisted.insert(db.pool()).await.unwrap();

        let all = Stock::list_active(db.pool(), None).await.unwrap();
        assert_eq!(
            all.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["平安银行", "万科A", "国华网安"]
        );

        let first_two = Stock::list_active(db.pool(), Some(2)).await.unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(first_two[0].id, all[0].id);

        assert_eq!(Stock::count(db.pool()).await.unwrap(), 4);
    }
}
