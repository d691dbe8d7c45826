//! # 充能計畫 ETF 報價模組
//!
//! 透過基本面行情介面取得場內 ETF 的即時價格。
//!
//! ## 站點資訊
//!
//! - 來源域名：`hq.chongnengjihua.com`
//! - 存取方式：HTTP GET，不需要 token
//! - 價格以千分之一元的整數回覆

use reqwest::Client;

/// ETF 基本面報價子模組。
pub mod fundamentals;

/// ETF 報價採集器。
pub struct ChongNeng {
    client: Client,
    url: String,
}

impl ChongNeng {
    pub fn new(client: Client, url: String) -> Self {
        ChongNeng { client, url }
    }
}
