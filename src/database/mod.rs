use std::{fs, path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::logging;

pub mod seed;
pub mod table;

/// 匯出報表需要的三張表
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS stock (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    status INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS stock_target (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS stock_data (
    stock_id INTEGER NOT NULL,
    period TEXT NOT NULL,
    target_id INTEGER NOT NULL,
    data REAL NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_stock_data_stock_id ON stock_data (stock_id, target_id);
";

/// SQLite 連線池封裝。
///
/// 在啟動時建立後以參數傳給 `database::table::*` 使用。
pub struct Sqlite {
    /// SQLx SQLite 連線池實例。
    pool: SqlitePool,
}

impl Sqlite {
    /// 開啟指定路徑的資料庫，檔案與目錄不存在時會自動建立。
    ///
    /// # Errors
    /// 當無法建立目錄或連線失敗時回傳錯誤。
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(dir) = Path::new(path).parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create the directory {}", dir.display()))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open the database {}", path))?;

        logging::info_file_async(format!("connect to {} ok", path));

        Ok(Sqlite { pool })
    }

    /// 記憶體資料庫，每條連線各是一個資料庫，所以只開一條。
    pub async fn memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Sqlite { pool })
    }

    /// 取得連線池參考。
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 建立資料表，已存在的表不會變動。
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(self.pool())
            .await
            .context("Failed to create the schema")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_twice() {
        let db = Sqlite::memory().await.unwrap();

        db.init_schema().await.unwrap();
        db.init_schema().await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('stock', 'stock_target', 'stock_data')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stock.db");

        let db = Sqlite::connect(path.to_str().unwrap()).await.unwrap();
        db.init_schema().await.unwrap();

        assert!(path.exists());
    }
}
