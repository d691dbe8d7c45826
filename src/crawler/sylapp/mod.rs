//! # 九方智投 K 線報價模組
//!
//! 透過九方智投的行情服務取得 A 股個股當日的 K 棒。
//!
//! ## 站點資訊
//!
//! - 來源域名：`qas.sylapp.cn`
//! - 存取方式：HTTP POST，JSON 請求內容，以 `token` 標頭驗證
//! - token 約 24 小時過期，過期時回覆代碼 `6403`

use reqwest::Client;

/// K 線報價子模組。
pub mod kline;

/// 九方智投報價採集器。
pub struct Sylapp {
    client: Client,
    url: String,
    token: String,
}

impl Sylapp {
    pub fn new(client: Client, url: String, token: String) -> Self {
        Sylapp { client, url, token }
    }
}
