use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::{
    config,
    crawler::{chongnengjihua::ChongNeng, sylapp::Sylapp},
    declare::{Instrument, InstrumentKind, QuoteRecord},
    logging,
};

/// 充能計畫 ETF 基本面報價
pub mod chongnengjihua;
/// 九方智投 個股 K 線報價
pub mod sylapp;

/// 抓取單一標的報價時可能發生的錯誤
#[derive(Error, Debug)]
pub enum FetchError {
    /// token 已過期，要重新取得 token 後以 --token 帶入
    #[error("token expired: {0}")]
    TokenExpired(String),

    /// 上游回覆了非成功的代碼
    #[error("upstream returned code {code}: {message}")]
    Upstream { code: String, message: String },

    /// 請求沒有送達或回覆的 HTTP 狀態不是成功
    #[error("request failed: {0:#}")]
    Transport(anyhow::Error),

    /// 回覆的內容不是預期的 JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_token_expired(&self) -> bool {
        matches!(self, FetchError::TokenExpired(_))
    }
}

/// 上游偶爾以 `null` 代替數值，與缺少欄位一樣當成預設值
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 報價來源，每次呼叫只會發出一個 HTTP 請求
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, instrument: &Instrument) -> Result<QuoteRecord, FetchError>;
}

/// 依標的種類分派到個股或 ETF 的報價來源
pub struct Fetcher {
    equity: Sylapp,
    fund: ChongNeng,
}

impl Fetcher {
    pub fn new(client: Client, upstream: &config::Upstream, token: String) -> Self {
        Fetcher {
            equity: Sylapp::new(client.clone(), upstream.kline_url.clone(), token),
            fund: ChongNeng::new(client, upstream.fundamentals_url.clone()),
        }
    }
}

#[async_trait]
impl QuoteSource for Fetcher {
    async fn fetch(&self, instrument: &Instrument) -> Result<QuoteRecord, FetchError> {
        match instrument.kind {
            InstrumentKind::Equity => self.equity.fetch(instrument).await,
            InstrumentKind::Fund => self.fund.fetch(instrument).await,
        }
    }
}

/// 依序取得每一檔標的的報價
///
/// 單一標的失敗只記錄日誌並以全為零的紀錄代替，讓表格的列數與欄位保持不變，
/// 其餘標的照常處理。
pub async fn fetch_all(source: &impl QuoteSource, instruments: &[Instrument]) -> Vec<QuoteRecord> {
    let mut records = Vec::with_capacity(instruments.len());

    for instrument in instruments {
        let record = match source.fetch(instrument).await {
            Ok(record) => record.with_identity(instrument),
            Err(why) => {
                if why.is_token_expired() {
                    logging::error_file_async(format!(
                        "Failed to fetch {} because the token has expired, restart with --token <new token>. {}",
                        instrument, why
                    ));
                } else {
                    logging::error_file_async(format!(
                        "Failed to fetch {} because {}",
                        instrument, why
                    ));
                }

                QuoteRecord::blank(&instrument.code, &instrument.name)
            }
        };

        records.push(record);
    }

    records
}
