use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

pub mod code_file;

const CONFIG_PATH: &str = "app.json";

/// 程式的設定值，啟動時讀取一次後以參數的方式傳給各個元件
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub watch: Watch,
    #[serde(default)]
    pub upstream: Upstream,
    #[serde(default)]
    pub sqlite: Sqlite,
    #[serde(default)]
    pub export: Export,
}

const QUOTE_CODE_FILE: &str = "QUOTE_CODE_FILE";
const QUOTE_POLL_INTERVAL_SECS: &str = "QUOTE_POLL_INTERVAL_SECS";
const QUOTE_COLOR: &str = "QUOTE_COLOR";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Watch {
    /// 存放 token 與股票清單的文字檔
    pub code_file: String,
    /// 每一輪報價之間的間隔秒數
    pub poll_interval_secs: u64,
    /// 漲跌以紅綠色顯示
    pub color: bool,
}

impl Default for Watch {
    fn default() -> Self {
        Watch {
            code_file: "code.txt".to_string(),
            poll_interval_secs: 5,
            color: true,
        }
    }
}

impl Watch {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn code_file_path(&self) -> PathBuf {
        PathBuf::from(&self.code_file)
    }
}

const QUOTE_KLINE_URL: &str = "QUOTE_KLINE_URL";
const QUOTE_FUNDAMENTALS_URL: &str = "QUOTE_FUNDAMENTALS_URL";
const QUOTE_REQUEST_TIMEOUT_SECS: &str = "QUOTE_REQUEST_TIMEOUT_SECS";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Upstream {
    /// 個股 K 線報價的網址
    pub kline_url: String,
    /// ETF 基本面報價的網址
    pub fundamentals_url: String,
    /// 單次請求的逾時秒數
    pub request_timeout_secs: u64,
}

impl Default for Upstream {
    fn default() -> Self {
        Upstream {
            kline_url: "https://qas.sylapp.cn/api/v30/busi".to_string(),
            fundamentals_url:
                "https://hq.chongnengjihua.com/rjhy-gmg-quote/api/1/stock/getastockfundamentals"
                    .to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Upstream {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

const QUOTE_SQLITE_PATH: &str = "QUOTE_SQLITE_PATH";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Sqlite {
    pub path: String,
}

impl Default for Sqlite {
    fn default() -> Self {
        Sqlite {
            path: "db/stock.db".to_string(),
        }
    }
}

const QUOTE_EXPORT_DIR: &str = "QUOTE_EXPORT_DIR";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Export {
    /// 匯出檔案的目錄
    pub dir: String,
    /// 報表第一列的大標題
    pub title: String,
}

impl Default for Export {
    fn default() -> Self {
        Export {
            dir: "file".to_string(),
            title: "财报数据".to_string(),
        }
    }
}

impl App {
    /// 有 app.json 就從檔案讀取，沒有就用預設值，最後再以 env 覆蓋
    pub fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(code_file) = env::var(QUOTE_CODE_FILE) {
            self.watch.code_file = code_file;
        }

        if let Ok(secs) = env::var(QUOTE_POLL_INTERVAL_SECS) {
            self.watch.poll_interval_secs =
                u64::from_str(&secs).unwrap_or(self.watch.poll_interval_secs);
        }

        if let Ok(color) = env::var(QUOTE_COLOR) {
            self.watch.color = bool::from_str(&color).unwrap_or(self.watch.color);
        }

        if let Ok(url) = env::var(QUOTE_KLINE_URL) {
            self.upstream.kline_url = url;
        }

        if let Ok(url) = env::var(QUOTE_FUNDAMENTALS_URL) {
            self.upstream.fundamentals_url = url;
        }

        if let Ok(secs) = env::var(QUOTE_REQUEST_TIMEOUT_SECS) {
            self.upstream.request_timeout_secs =
                u64::from_str(&secs).unwrap_or(self.upstream.request_timeout_secs);
        }

        if let Ok(path) = env::var(QUOTE_SQLITE_PATH) {
            self.sqlite.path = path;
        }

        if let Ok(dir) = env::var(QUOTE_EXPORT_DIR) {
            self.export.dir = dir;
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let app = App::default();

        assert_eq!(app.watch.code_file, "code.txt");
        assert_eq!(app.watch.poll_interval(), Duration::from_secs(5));
        assert_eq!(app.upstream.request_timeout(), Duration::from_secs(10));
        assert_eq!(app.sqlite.path, "db/stock.db");
        assert_eq!(app.export.dir, "file");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let app: App = serde_json::from_str(
            r#"{"watch":{"poll_interval_secs":30},"sqlite":{"path":"/tmp/q.db"}}"#,
        )
        .unwrap();

        assert_eq!(app.watch.poll_interval_secs, 30);
        assert_eq!(app.watch.code_file, "code.txt");
        assert!(app.watch.color);
        assert_eq!(app.sqlite.path, "/tmp/q.db");
        assert_eq!(app.upstream.request_timeout_secs, 10);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let watch = Watch {
            poll_interval_secs: 0,
            ..Default::default()
        };

        assert_eq!(watch.poll_interval(), Duration::from_secs(1));
    }
}
