use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 在終端機定時刷新 A 股與 ETF 的報價，並可將財報數據匯出成 xlsx
#[derive(Parser, Debug)]
#[command(name = "quote_watcher")]
#[command(version)]
pub struct Cli {
    /// 沒有給子命令時等同 `watch`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 定時抓取報價並原地刷新表格
    Watch {
        /// 新的 token，會寫回代碼檔
        #[arg(long)]
        token: Option<String>,
        /// 代碼檔路徑，預設讀取設定值
        #[arg(long)]
        code_file: Option<PathBuf>,
    },
    /// 將資料庫中的財報數據匯出成 xlsx
    Export {
        /// 只匯出前 N 家公司
        #[arg(long)]
        limit: Option<i64>,
        /// 輸出目錄，預設讀取設定值
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 以亂數填入示範用的財報數據
    Seed {
        #[arg(long, default_value_t = 3)]
        stocks: usize,
    },
    /// 建立資料表
    InitDb,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Watch {
            token: None,
            code_file: None,
        })
    }
}
